//! File management session against the processing backend
//!
//! Tracks the file lists and the user's selections, and issues processing,
//! analysis, deletion and upload requests. The session never touches the
//! scene; choosing an LOD file here is paired with [`Viewer::select_file`]
//! by the caller.
//!
//! [`Viewer::select_file`]: mbviewer_visualization::Viewer::select_file

use mbviewer_core::Result;
use mbviewer_gateway::{BackendApi, ProcessingSettings, ScriptKind, ScriptSelection};

pub struct ViewerSession<B> {
    backend: B,
    lod_files: Vec<String>,
    raw_files: Vec<String>,
    selected_raw_file: Option<String>,
    selected_lod_file: Option<String>,
    scripts: ScriptSelection,
    is_file_processing: bool,
}

impl<B: BackendApi> ViewerSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lod_files: Vec::new(),
            raw_files: Vec::new(),
            selected_raw_file: None,
            selected_lod_file: None,
            scripts: ScriptSelection::new(),
            is_file_processing: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn lod_files(&self) -> &[String] {
        &self.lod_files
    }

    pub fn raw_files(&self) -> &[String] {
        &self.raw_files
    }

    pub fn selected_raw_file(&self) -> Option<&str> {
        self.selected_raw_file.as_deref()
    }

    pub fn selected_lod_file(&self) -> Option<&str> {
        self.selected_lod_file.as_deref()
    }

    pub fn scripts(&self) -> &ScriptSelection {
        &self.scripts
    }

    /// True while a processing request is outstanding
    pub fn is_file_processing(&self) -> bool {
        self.is_file_processing
    }

    /// Fetch both file lists from the backend
    pub async fn refresh_file_lists(&mut self) -> Result<()> {
        self.lod_files = self.backend.list_lod_file_names().await?;
        self.raw_files = self.backend.list_raw_file_names().await?;
        log::debug!(
            "File lists refreshed: {} LOD files, {} raw files",
            self.lod_files.len(),
            self.raw_files.len()
        );
        Ok(())
    }

    pub fn select_raw_file(&mut self, name: &str) {
        self.selected_raw_file = Some(name.to_string());
    }

    pub fn select_lod_file(&mut self, name: &str) {
        self.selected_lod_file = Some(name.to_string());
    }

    /// Convert the selected raw file into LOD variants, then refresh the lists.
    ///
    /// Returns `Ok(false)` without a request when no raw file is selected.
    pub async fn process_file(&mut self, sep: &str, to_utm: bool) -> Result<bool> {
        let Some(filename) = self.selected_raw_file.clone() else {
            log::warn!("No raw file selected for processing");
            return Ok(false);
        };

        let settings = ProcessingSettings {
            filename,
            sep: sep.to_string(),
            to_utm,
        };
        log::info!("Processing {} (sep {:?}, to_utm {})", settings.filename, settings.sep, to_utm);

        self.is_file_processing = true;
        let result = self.backend.process_file(&settings).await;
        self.is_file_processing = false;

        let accepted = result?;
        self.refresh_file_lists().await?;
        Ok(accepted)
    }

    pub fn toggle_script(&mut self, kind: ScriptKind) {
        self.scripts.toggle(kind);
    }

    /// Run the toggled analysis methods on the selected LOD file.
    ///
    /// Returns `Ok(None)` when no LOD file is selected or no method is toggled.
    pub async fn execute_scripts(&mut self) -> Result<Option<bool>> {
        let Some(filename) = self.selected_lod_file.as_deref() else {
            return Ok(None);
        };
        let Some(settings) = self.scripts.to_settings(filename) else {
            return Ok(None);
        };

        log::info!("Executing scripts on {}", settings.filename);
        let accepted = self.backend.execute_scripts(&settings).await?;
        Ok(Some(accepted))
    }

    /// Delete the selected raw file, then refresh the lists.
    ///
    /// Returns `Ok(false)` without a request when no raw file is selected.
    pub async fn delete_selected_file(&mut self) -> Result<bool> {
        let Some(file_name) = self.selected_raw_file.clone() else {
            return Ok(false);
        };

        log::info!("Deleting {}", file_name);
        let deleted = self.backend.delete_file(&file_name).await?;
        self.refresh_file_lists().await?;
        Ok(deleted)
    }

    pub async fn upload_file(&mut self, file_name: &str, contents: Vec<u8>) -> Result<()> {
        log::info!("Uploading {} ({} bytes)", file_name, contents.len());
        self.backend.upload_file(file_name, contents).await
    }
}
