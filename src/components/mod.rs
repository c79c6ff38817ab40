pub mod station_designer;
