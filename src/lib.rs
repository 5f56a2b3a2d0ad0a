/// Folder
pub mod dataloader;
pub mod layers;
pub mod models;
pub mod util;

/// Files
pub mod cpu_params;
pub mod err;
pub mod layer_fabric;
pub mod orchestra;
pub mod params_io;
pub mod settings;

pub mod prelude {
    pub use crate::dataloader::{DataLoader, Example, SimpleDataLoader, TargetEncoding};
    pub use crate::err::{NetError, NetResult};
    pub use crate::layer_fabric::ParamSource;
    pub use crate::models::{Model, Sequential};
    pub use crate::orchestra::{CallbackReturnAction, EvalReport, Orchestra};
    pub use crate::settings::ModelSettings;
    pub use crate::util::{Activation, DataVec, Float};
}
