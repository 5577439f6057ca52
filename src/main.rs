mod bus;
mod cartridge;
mod config;
mod deck;
mod engine;
mod library;
mod mpris;
mod runtime;
mod transport;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    runtime::run()
}
