pub mod server;

/// What the CLI resolved to do.
#[derive(Debug)]
pub enum Action {
    Server { port: u16, dsn: String },
}
