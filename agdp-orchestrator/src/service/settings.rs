//! Settings Service
//!
//! Runtime settings stored as key/value pairs.

use agdp_core::domain::settings::Settings;
use agdp_core::dto::settings::UpdateSettings;
use agdp_core::store::{SettingsStore, StoreError};

/// Service error type
#[derive(Debug)]
pub enum SettingsError {
    ValidationError(String),
    StoreError(StoreError),
}

impl From<StoreError> for SettingsError {
    fn from(err: StoreError) -> Self {
        SettingsError::StoreError(err)
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Current settings with defaults filled in
pub async fn get_settings<S>(store: &S) -> Result<Settings>
where
    S: SettingsStore + ?Sized,
{
    let pairs = store.load_settings().await?;
    Ok(Settings::from_pairs(&pairs))
}

/// Upsert the present fields and return the resulting settings
pub async fn update_settings<S>(store: &S, req: UpdateSettings) -> Result<Settings>
where
    S: SettingsStore + ?Sized,
{
    validate_update_request(&req)?;

    let pairs = req.into_pairs();
    let keys: Vec<&str> = pairs.keys().map(String::as_str).collect();
    tracing::info!("Updating settings: {}", keys.join(", "));

    store.store_settings(pairs).await?;

    get_settings(store).await
}

/// Write the defaults for every key that is not stored yet
pub async fn seed_defaults<S>(store: &S) -> Result<Settings>
where
    S: SettingsStore + ?Sized,
{
    store.seed_settings(Settings::default().to_pairs()).await?;

    let settings = get_settings(store).await?;
    tracing::debug!("Settings loaded (model: {})", settings.llm_model);

    Ok(settings)
}

fn validate_update_request(req: &UpdateSettings) -> Result<()> {
    if req.llm_model.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return Err(SettingsError::ValidationError(
            "llm_model cannot be empty".to_string(),
        ));
    }

    if req.storage_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(SettingsError::ValidationError(
            "storage_path cannot be empty".to_string(),
        ));
    }

    if let Some(url) = &req.llm_base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(SettingsError::ValidationError(format!(
            "llm_base_url must be an http(s) URL, got '{}'",
            url
        )));
    }

    Ok(())
}
