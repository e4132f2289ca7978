//! Application state shared by all handlers.

use mediaconv_core::{Config, FormatRegistry};
use mediaconv_processing::{ConversionDispatcher, MediaValidator};
use mediaconv_storage::LocalStorage;

/// Immutable after start-up; handlers receive it as `State<Arc<AppState>>`.
pub struct AppState {
    pub config: Config,
    pub formats: &'static FormatRegistry,
    pub storage: LocalStorage,
    pub validator: MediaValidator,
    pub dispatcher: ConversionDispatcher,
}
