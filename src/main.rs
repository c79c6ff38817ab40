use leptos::prelude::*;
use station_designer::config::AppConfig;
use station_designer::{App, init_logging};

fn main() {
	init_logging(AppConfig::from_env().log_level);
	mount_to_body(App);
}
