use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(
        "Dataset(s) not found: [{}]. Please enter a query that relates to any of the available datasets, which are: {}.",
        names.join(", "),
        available.join(", ")
    )]
    UnknownLayer {
        names: Vec<String>,
        available: Vec<String>,
    },
}
