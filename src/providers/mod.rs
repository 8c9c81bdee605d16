pub mod argentinadatos;
pub mod dolarapi;
pub mod http;

pub use argentinadatos::ArgentinaDatosProvider;
pub use dolarapi::DolarApiProvider;
