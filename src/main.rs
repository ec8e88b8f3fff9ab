mod app;
mod audio;
mod config;
mod error;
mod library;
mod lyrics;
mod mpris;
mod render;
mod runtime;
mod seek;
#[cfg(test)]
mod testing;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
