mod connections;
mod devices;
mod locations;
mod racks;

pub use connections::*;
pub use devices::*;
pub use locations::*;
pub use racks::*;
