//! Command dispatch over the shared scene.
//!
//! The scene lock is held for the whole of a command; the store lock is only
//! ever taken while the scene lock is held, so the two cannot deadlock.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::Notify;
use voxcsg_core::bounds::GridBounds;
use voxcsg_core::constants::{BOX_SHAPE, FIGURE_LEG_A, FIGURE_LEG_B, FIGURE_OBJECT_TYPE};
use voxcsg_core::object::{ObjectId, ObjectSpec, StoredObject};
use voxcsg_core::shape::Parameters;
use voxcsg_core::types::Coord;
use voxcsg_mesh::{export, ExportError, Unit};
use voxcsg_persist::{JsonFileStore, MemoryStore, ObjectStore, PersistError};
use voxcsg_shapes::{Interpreter, LoadError, ShapeError, ShapeLibrary};
use voxcsg_world::figure::pythagorean_figure;
use voxcsg_world::{Renderer, Scene};

use crate::command::{parse_command, Command};
use crate::config::SessionConfig;

pub const NOT_RECOGNIZED: &str = "Command not recognized";
pub const INCOMPLETE: &str = "Incomplete or unrecognized command";
pub const MISSING_POSITION: &str =
    "Incomplete command: specify a position (e.g. 'draw a box at 50,50,50')";
pub const NO_OBJECTS: &str = "No objects found";
pub const SHUTTING_DOWN: &str = "Shutting down...";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "unable to draw the box at ({}, {}, {}): {source}",
        .position.x,
        .position.y,
        .position.z
    )]
    Draw {
        position: Coord,
        #[source]
        source: ShapeError,
    },
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("storage unavailable: {0}")]
    Storage(#[from] PersistError),
    #[error("command channel closed")]
    ChannelClosed,
}

/// Cooperative termination flag shared by the controller and the channel.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug, Default)]
struct ShutdownInner {
    triggered: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once `trigger` has been called, including before this call.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

pub struct SessionController {
    scene: Mutex<Scene>,
    store: Mutex<Box<dyn ObjectStore>>,
    interpreter: Interpreter<ShapeLibrary>,
    export_path: PathBuf,
    export_unit: Unit,
    shutdown: ShutdownSignal,
}

impl SessionController {
    pub fn new(scene: Scene, store: Box<dyn ObjectStore>, library: ShapeLibrary) -> Self {
        Self {
            scene: Mutex::new(scene),
            store: Mutex::new(store),
            interpreter: Interpreter::new(library),
            export_path: PathBuf::from("output.stl"),
            export_unit: Unit::Millimeters,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn with_export(mut self, path: impl Into<PathBuf>, unit: Unit) -> Self {
        self.export_path = path.into();
        self.export_unit = unit;
        self
    }

    /// Build a controller from configuration: built-in shapes merged with
    /// `shapes_dir`, and the configured store and export target.
    pub fn from_config(
        config: &SessionConfig,
        renderer: Box<dyn Renderer>,
    ) -> Result<Self, LoadError> {
        let library = match &config.shapes_dir {
            Some(dir) => {
                let (library, warnings) = ShapeLibrary::with_dir(dir)?;
                log::info!(
                    "Loaded {} shape definitions from {} ({} warnings)",
                    library.len(),
                    dir.display(),
                    warnings.len()
                );
                library
            }
            None => ShapeLibrary::builtin()?,
        };

        let store: Box<dyn ObjectStore> = if config.uses_memory_store() {
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsonFileStore::new(&config.store_path))
        };
        let scene = Scene::new(GridBounds::new(config.grid_size), renderer)
            .with_color_tracking(config.track_colors);

        Ok(Self::new(scene, store, library)
            .with_export(config.export_path.clone(), Unit::parse(&config.export_unit)))
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Run one command and return its single-line response.
    pub fn handle(&self, text: &str) -> String {
        log::info!("Command received: {}", text.trim());
        let response = match parse_command(text) {
            Ok(command) => self.dispatch(command),
            Err(e) => {
                log::debug!("Rejected command: {}", e);
                INCOMPLETE.to_string()
            }
        };
        log::info!("Response: {}", response);
        response
    }

    fn dispatch(&self, command: Command) -> String {
        match command {
            Command::DrawBox {
                position: None, ..
            }
            | Command::DrawFigure { position: None, .. } => MISSING_POSITION.to_string(),
            Command::DrawBox {
                position: Some(position),
                negative,
                description,
            } => match self.draw_box(position, negative, description) {
                Ok(id) => format!("Box drawn at {} (ID: {})", format_position(position), id),
                Err(e) => error_response(&e),
            },
            Command::DrawFigure {
                position: Some(position),
                description,
            } => match self.draw_figure(position, description) {
                Ok(id) => format!(
                    "Pythagorean theorem drawn at {} (ID: {})",
                    format_position(position),
                    id
                ),
                Err(e) => error_response(&e),
            },
            Command::SaveStl => match self.save_stl() {
                Ok(()) => format!("STL file saved as {}", self.export_path.display()),
                Err(e) => error_response(&e),
            },
            Command::LoadObjects { id } => match self.load_objects(id) {
                Ok((0, _)) => NO_OBJECTS.to_string(),
                Ok((total, loaded)) => format!("Loaded {} objects (of {} total)", loaded, total),
                Err(e) => error_response(&e),
            },
            Command::Exit => {
                self.shutdown();
                SHUTTING_DOWN.to_string()
            }
            Command::Unrecognized => NOT_RECOGNIZED.to_string(),
        }
    }

    /// Draw the built-in box and persist it with the parameters it was
    /// drawn with.
    pub fn draw_box(
        &self,
        position: Coord,
        negative: bool,
        description: Option<String>,
    ) -> Result<ObjectId, SessionError> {
        let parameters = self
            .interpreter
            .source()
            .get(BOX_SHAPE)
            .map(|shape| shape.parameters.clone())
            .unwrap_or_default();

        let mut scene = self.lock_scene();
        self.interpreter
            .interpret(
                &mut scene,
                BOX_SHAPE,
                position,
                &parameters,
                negative.then_some(true),
            )
            .map_err(|source| SessionError::Draw { position, source })?;

        let id = self.lock_store().save_object(ObjectSpec {
            shape: BOX_SHAPE.to_string(),
            parameters,
            position: position.to_array(),
            negative,
            description,
        })?;
        Ok(id)
    }

    pub fn draw_figure(
        &self,
        position: Coord,
        description: Option<String>,
    ) -> Result<ObjectId, SessionError> {
        let mut scene = self.lock_scene();
        let records = pythagorean_figure(position, FIGURE_LEG_A, FIGURE_LEG_B, scene.bounds());
        scene.apply(records);

        let id = self.lock_store().save_object(ObjectSpec {
            shape: FIGURE_OBJECT_TYPE.to_string(),
            parameters: Parameters::new(),
            position: position.to_array(),
            negative: false,
            description,
        })?;
        Ok(id)
    }

    /// Export the canonical voxels to the configured path.
    pub fn save_stl(&self) -> Result<(), SessionError> {
        let coords = self.lock_scene().voxels().coords();
        export(&coords, &self.export_path, self.export_unit)?;
        Ok(())
    }

    /// Replace the scene with stored objects. Returns `(rows, replayed)`;
    /// the scene is left untouched when there are no rows.
    pub fn load_objects(&self, id: Option<ObjectId>) -> Result<(usize, usize), SessionError> {
        let mut scene = self.lock_scene();
        let rows = self.lock_store().load_objects(id)?;
        if rows.is_empty() {
            return Ok((0, 0));
        }

        scene.clear();
        let loaded = rows
            .iter()
            .filter(|row| self.replay(&mut scene, row))
            .count();
        Ok((rows.len(), loaded))
    }

    fn replay(&self, scene: &mut Scene, row: &StoredObject) -> bool {
        let origin = row.spec.origin();
        if row.spec.shape == FIGURE_OBJECT_TYPE {
            let records = pythagorean_figure(origin, FIGURE_LEG_A, FIGURE_LEG_B, scene.bounds());
            scene.apply(records);
            return true;
        }
        match self.interpreter.interpret(
            scene,
            &row.spec.shape,
            origin,
            &row.spec.parameters,
            row.spec.negative.then_some(true),
        ) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Object {} ({}) not loaded: {}", row.id, row.spec.shape, e);
                false
            }
        }
    }

    pub fn shutdown(&self) {
        log::info!("Shutdown requested");
        self.shutdown.trigger();
    }

    pub fn voxel_count(&self) -> usize {
        self.lock_scene().voxels().len()
    }

    pub fn coords(&self) -> Vec<Coord> {
        self.lock_scene().voxels().coords()
    }

    pub fn stored_objects(&self) -> Result<Vec<StoredObject>, SessionError> {
        let _scene = self.lock_scene();
        Ok(self.lock_store().load_objects(None)?)
    }

    fn lock_scene(&self) -> MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(|poisoned| {
            log::warn!("Scene lock poisoned; recomputing canonical state");
            let mut scene = poisoned.into_inner();
            scene.recompute();
            scene
        })
    }

    fn lock_store(&self) -> MutexGuard<'_, Box<dyn ObjectStore>> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn error_response(error: &SessionError) -> String {
    log::warn!("Command failed: {}", error);
    match error {
        SessionError::Export(ExportError::EmptyVoxelSet) => "Error: no voxels to export".to_string(),
        other => format!("Error: {}", other),
    }
}

pub fn format_position(position: Coord) -> String {
    format!("({}, {}, {})", position.x, position.y, position.z)
}
