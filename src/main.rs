mod app;
mod audio;
mod config;
mod controller;
mod engine;
mod playlist;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
