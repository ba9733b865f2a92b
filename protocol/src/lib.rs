pub mod ds;
pub mod ds_client;
pub mod entities;
pub mod file_transfer;
pub mod frame;
