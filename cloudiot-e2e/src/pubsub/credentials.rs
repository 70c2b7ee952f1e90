use crate::config::HarnessConfig;
use crate::helpers::{E2EError, E2EResult};

/// Verify the environment names a project and usable service account credentials.
///
/// Against an emulator only the project id is required.
pub fn check_credentials(cfg: &HarnessConfig) -> E2EResult<()> {
    if cfg.project_id.is_none() {
        return Err(E2EError::Credentials(
            "set GCLOUD_PROJECT or GOOGLE_CLOUD_PROJECT to the project under test".to_string(),
        ));
    }

    if cfg.emulator_host.is_some() {
        return Ok(());
    }

    let Some(path) = &cfg.application_credentials else {
        return Err(E2EError::Credentials(
            "GOOGLE_APPLICATION_CREDENTIALS is not set".to_string(),
        ));
    };

    if !path.is_file() {
        return Err(E2EError::Credentials(format!(
            "GOOGLE_APPLICATION_CREDENTIALS points to a missing file: {}",
            path.display()
        )));
    }

    Ok(())
}
