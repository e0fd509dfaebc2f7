use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not open the catalog")]
    Catalog,
    #[display("could not open the library")]
    Storage,
    #[display("completion endpoint is not configured")]
    Llm,
    /// A service failed; carries the text meant for the user.
    #[display("{_0}")]
    Service(#[error(not(source))] &'static str),
}
