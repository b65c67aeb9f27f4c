use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::error;

use crate::months::MonthId;

pub struct Args {
    /// Archive root: a directory or an http(s) base URL.
    pub data_root: String,
    /// User directory under the data root.
    pub user: Option<String>,
    /// Activity to open at startup.
    pub workout: Option<u64>,
    /// Initial calendar focus date.
    pub date: Option<NaiveDate>,
    /// Last month the archive has data for; later months are never fetched.
    pub archive_end: Option<MonthId>,
    /// Tile URL template with {z}/{x}/{y} placeholders.
    pub tiles: Option<String>,
    pub light: bool,
    pub debug: bool,
}

impl Args {
    // parse arguments, return set of unrecognized args
    pub fn parse(args: &[String]) -> (Self, BTreeSet<String>) {
        let mut unrecognized_args = BTreeSet::new();
        let mut res = Args {
            data_root: "data".to_owned(),
            user: None,
            workout: None,
            date: None,
            archive_end: None,
            tiles: None,
            light: false,
            debug: false,
        };

        let mut i = 0;
        let len = args.len();
        while i < len {
            let arg = &args[i];

            if arg == "--light" {
                res.light = true;
            } else if arg == "--dark" {
                res.light = false;
            } else if arg == "--debug" {
                res.debug = true;
            } else if arg == "--data" {
                i += 1;
                let path = if let Some(next_arg) = args.get(i) {
                    next_arg
                } else {
                    error!("data argument missing?");
                    continue;
                };
                res.data_root = path.clone();
            } else if arg == "--user" {
                i += 1;
                let user = if let Some(next_arg) = args.get(i) {
                    next_arg
                } else {
                    error!("user argument missing?");
                    continue;
                };
                res.user = Some(user.clone());
            } else if arg == "--workout" {
                i += 1;
                let id = if let Some(next_arg) = args.get(i) {
                    next_arg
                } else {
                    error!("workout argument missing?");
                    continue;
                };
                if let Ok(id) = id.parse::<u64>() {
                    res.workout = Some(id);
                } else {
                    error!("failed to parse --workout argument. Expected a numeric activity id.");
                }
            } else if arg == "--date" {
                i += 1;
                let date = if let Some(next_arg) = args.get(i) {
                    next_arg
                } else {
                    error!("date argument missing?");
                    continue;
                };
                match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                    Ok(date) => res.date = Some(date),
                    Err(err) => error!("failed to parse --date argument: {err}"),
                }
            } else if arg == "--archive-end" {
                i += 1;
                let month = if let Some(next_arg) = args.get(i) {
                    next_arg
                } else {
                    error!("archive-end argument missing?");
                    continue;
                };
                if let Some(month) = MonthId::parse(month) {
                    res.archive_end = Some(month);
                } else {
                    error!("failed to parse --archive-end argument. Expected YYYY-MM.");
                }
            } else if arg == "--tiles" {
                i += 1;
                let url = if let Some(next_arg) = args.get(i) {
                    next_arg
                } else {
                    error!("tiles argument missing?");
                    continue;
                };
                res.tiles = Some(url.clone());
            } else {
                unrecognized_args.insert(arg.clone());
            }

            i += 1;
        }

        (res, unrecognized_args)
    }
}
