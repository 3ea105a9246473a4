//! # Tunepani - Drum Tuning GUI
//!
//! This module contains the main GUI application for the Tunepani drum tuner.
//! Users place drum pads, give each a target note, play a reference tone per
//! pad and watch a flat/sharp gauge driven by the microphone.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application owning the tuning session
//! - **Analysis Thread**: microphone capture and pitch tracking (`AnalysisSession`)
//! - **Synth Thread**: reference tone output stream (`SynthBackend`)
//! - **Communication**: Crossbeam channels for pitch samples and synth commands
//! - **Updates**: 60 FPS ticks drain the latest pitch samples

mod ui;

use clap::Parser;
use crossbeam_channel::Receiver;
use iced::{Element, Point, Size, Subscription, Task, Theme};
use std::path::PathBuf;
use tunepani_core::{
    analysis::AnalysisSession,
    gauge::{GaugeReading, GaugeScale},
    notes::NoteFrequencyTable,
    pads::{PadId, PadLayout, Rect},
    session::TuningSession,
    settings::Settings,
    store::{ConfigurationStore, SavedConfiguration},
    synth::SynthBackend,
    tone::ToneState,
    tutorial::{Tutorial, TutorialMarker},
    PitchSample,
};
use ui::main_display::create_main_view;
use ui::pad_area::PadView;

#[derive(Parser, Debug)]
#[command(name = "tunepani", version, about = "Reference tones and a pitch gauge for tuning drums")]
struct Cli {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main entry point for the Tunepani application.
pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    let settings = Settings::load(cli.config.as_deref())?;

    log::info!("[MAIN] Starting Tunepani...");
    iced::application("Tunepani", TunepaniApp::update, TunepaniApp::view)
        .subscription(TunepaniApp::subscription)
        .theme(TunepaniApp::theme)
        .run_with(move || (TunepaniApp::new(settings.clone()), Task::none()))?;
    log::info!("[MAIN] Application finished");
    Ok(())
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    // Pad interactions
    AddPad,
    PadToggled(PadId),
    PadDragged(PadId, Point),  // new top-left corner while dragging
    PadDropped { id: PadId, position: Point, trash: Rect },
    PadSelected(PadId),        // opens the note picker for this pad
    NoteSelected(&'static str),
    ClosePicker,

    VolumeChanged(f32),

    // Sidebar: saved pieces and settings
    ToggleMenu,
    ConfigNameChanged(String),
    SaveConfiguration,
    LoadConfiguration(u64),
    DeleteConfiguration(u64),
    OverwriteConfiguration(u64),
    RenameClicked(u64),        // starts renaming, or commits when already renaming
    RenameChanged(String),
    CommitRename,
    ToggleDarkMode(bool),

    // First-run tutorial
    TutorialNext,
    TutorialBack,

    WindowResized(Size),

    // Continuous update message
    Tick,
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub pads: Vec<PadView>,
    pub pads_full: bool,
    pub pad_area_width: f32,
    pub selected_pad: Option<PadId>,
    pub selected_note: Option<String>,

    pub reading: GaugeReading,
    pub gauge_scale: GaugeScale,
    pub detected_frequency: f32,
    pub volume: f32,

    pub menu_open: bool,
    pub config_name: String,
    pub configs: Vec<SavedConfiguration>,
    pub renaming: Option<(u64, String)>,
    pub dark_mode: bool,
    pub tutorial_step: Option<usize>,

    pub output_available: bool,
}

/// Main application state for the Tunepani drum tuner.
struct TunepaniApp {
    session: TuningSession<SynthBackend>,
    // Held for its lifetime: dropping it releases the microphone.
    _analysis: AnalysisSession,
    pitch_receiver: Receiver<PitchSample>,
    last_sample: PitchSample,
    store: ConfigurationStore,
    tutorial: Option<Tutorial>,
    tutorial_marker: TutorialMarker,

    // Single source of truth for all display data
    display_data: AppDisplayData,
}

impl TunepaniApp {
    /// Creates the application: opens the output device, starts microphone
    /// analysis and loads the saved pieces.
    ///
    /// Audio failures leave the matching subsystem inert; the window still
    /// opens.
    fn new(settings: Settings) -> Self {
        let table = NoteFrequencyTable::standard().clone();

        let backend = match SynthBackend::start() {
            Ok(backend) => backend,
            Err(e) => {
                log::error!("[MAIN] Reference tones disabled: {}", e);
                SynthBackend::disconnected()
            }
        };
        let output_available = backend.is_connected();

        let session = TuningSession::new(
            backend,
            table.clone(),
            PadLayout::new(settings.pad_area_width),
            settings.initial_volume,
        );

        let (analysis, pitch_receiver) = AnalysisSession::start(&settings, table);

        let store = match ConfigurationStore::open(&settings.storage_path) {
            Ok(store) => store,
            Err(e) => {
                log::error!("[MAIN] Could not read saved pieces: {}", e);
                ConfigurationStore::empty(&settings.storage_path)
            }
        };

        let tutorial_marker = TutorialMarker::beside(&settings.storage_path);
        let tutorial = (!tutorial_marker.is_set()).then(Tutorial::new);

        let gauge_scale = settings.gauge_scale();
        let pad_area_width = session.layout().area_width();
        let mut app = Self {
            session,
            _analysis: analysis,
            pitch_receiver,
            last_sample: PitchSample::silent(),
            store,
            tutorial,
            tutorial_marker,
            display_data: AppDisplayData {
                pads: Vec::new(),
                pads_full: false,
                pad_area_width,
                selected_pad: None,
                selected_note: None,
                reading: gauge_scale.idle(),
                gauge_scale,
                detected_frequency: 0.0,
                volume: settings.initial_volume,
                menu_open: false,
                config_name: String::new(),
                configs: Vec::new(),
                renaming: None,
                dark_mode: settings.dark_mode,
                tutorial_step: None,
                output_available,
            },
        };
        app.refresh_display();
        app.refresh_configs();
        log::info!("[MAIN] TunepaniApp created");
        app
    }

    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) {
        if let Message::Tick = message {
            // Keep only the newest sample; older ones are already stale.
            while let Ok(sample) = self.pitch_receiver.try_recv() {
                self.last_sample = sample;
            }
            self.refresh_reading();
            return;
        }
        log::debug!("[UPDATE] Received message: {:?}", message);

        match message {
            Message::AddPad => {
                if let Err(e) = self.session.add_pad() {
                    log::warn!("[MAIN] {}", e);
                }
            }
            Message::PadToggled(id) => {
                if self.session.toggle_pad(id) == ToneState::Silent {
                    log::debug!("[MAIN] Pad {} is silent", id);
                }
            }
            Message::PadDragged(id, position) => {
                if let Err(e) = self.session.move_pad(id, position.x, position.y) {
                    log::warn!("[MAIN] {}", e);
                }
            }
            Message::PadDropped { id, position, trash } => {
                match self.session.drop_pad(id, position.x, position.y, Some(trash)) {
                    Ok(true) => {
                        if self.display_data.selected_pad == Some(id) {
                            self.display_data.selected_pad = None;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => log::warn!("[MAIN] {}", e),
                }
            }
            Message::PadSelected(id) => {
                self.display_data.selected_pad = Some(id);
            }
            Message::NoteSelected(note) => {
                if let Some(id) = self.display_data.selected_pad.take() {
                    if let Err(e) = self.session.reassign_note(id, note) {
                        log::warn!("[MAIN] {}", e);
                    }
                }
            }
            Message::ClosePicker => {
                self.display_data.selected_pad = None;
            }
            Message::VolumeChanged(volume) => {
                self.session.set_volume(volume);
            }
            Message::ToggleMenu => {
                self.display_data.menu_open = !self.display_data.menu_open;
            }
            Message::ConfigNameChanged(name) => {
                self.display_data.config_name = name;
            }
            Message::SaveConfiguration => {
                match self.store.save(&self.display_data.config_name, self.session.snapshot()) {
                    Ok(id) => {
                        log::info!("[MAIN] Saved piece {}", id);
                        self.display_data.config_name.clear();
                    }
                    Err(e) => log::error!("[MAIN] Error saving piece: {}", e),
                }
                self.refresh_configs();
            }
            Message::LoadConfiguration(id) => {
                if let Some(config) = self.store.get(id) {
                    let drums = config.drums.clone();
                    self.session.load_pads(drums);
                    self.display_data.selected_pad = None;
                    self.display_data.menu_open = false;
                }
            }
            Message::DeleteConfiguration(id) => {
                if let Err(e) = self.store.delete(id) {
                    log::error!("[MAIN] Error deleting piece: {}", e);
                }
                self.refresh_configs();
            }
            Message::OverwriteConfiguration(id) => {
                if let Err(e) = self.store.overwrite(id, self.session.snapshot()) {
                    log::error!("[MAIN] Error overwriting piece: {}", e);
                }
                self.refresh_configs();
            }
            Message::RenameClicked(id) => {
                let already_renaming = matches!(&self.display_data.renaming, Some((current, _)) if *current == id);
                if already_renaming {
                    self.commit_rename();
                } else {
                    let name = self.store.get(id).map(|c| c.name.clone()).unwrap_or_default();
                    self.display_data.renaming = Some((id, name));
                }
            }
            Message::RenameChanged(value) => {
                if let Some((_, name)) = &mut self.display_data.renaming {
                    *name = value;
                }
            }
            Message::CommitRename => self.commit_rename(),
            Message::ToggleDarkMode(enabled) => {
                self.display_data.dark_mode = enabled;
            }
            Message::TutorialNext => {
                let finished = self.tutorial.as_mut().is_some_and(|t| t.next());
                if finished {
                    self.tutorial = None;
                    if let Err(e) = self.tutorial_marker.set() {
                        log::error!("[MAIN] Could not record finished tutorial: {}", e);
                    }
                }
            }
            Message::TutorialBack => {
                if let Some(tutorial) = self.tutorial.as_mut() {
                    tutorial.back();
                }
            }
            Message::WindowResized(size) => {
                let layout = PadLayout::for_window(size.width);
                self.session.set_layout(layout);
                self.display_data.pad_area_width = layout.area_width();
            }
            Message::Tick => {}
        }

        self.refresh_display();
    }

    fn commit_rename(&mut self) {
        if let Some((id, name)) = self.display_data.renaming.take() {
            if let Err(e) = self.store.rename(id, &name) {
                log::error!("[MAIN] Error renaming piece: {}", e);
            }
        }
        self.refresh_configs();
    }

    /// Copies session and tutorial state into the display data.
    fn refresh_display(&mut self) {
        let session = &self.session;
        let selected_pad = self.display_data.selected_pad;
        let pads = session
            .pads()
            .iter()
            .map(|pad| PadView {
                id: pad.id,
                note: pad.note.clone(),
                x: pad.x,
                y: pad.y,
                sounding: session.pad_state(pad.id) == ToneState::Sounding,
                selected: selected_pad == Some(pad.id),
            })
            .collect();

        let data = &mut self.display_data;
        data.pads = pads;
        data.pads_full = session.pads().is_full();
        data.selected_note = selected_pad
            .and_then(|id| session.pads().get(id))
            .map(|pad| pad.note.clone());

        data.volume = session.volume();
        data.tutorial_step = self.tutorial.map(|t| t.step());
    }

    /// Updates the gauge from the newest pitch sample.
    fn refresh_reading(&mut self) {
        let data = &mut self.display_data;
        data.reading = data.gauge_scale.reading(&self.last_sample, self.session.table());
        data.detected_frequency = self.last_sample.frequency;
    }

    /// Copies the saved pieces; only needed after the store changes.
    fn refresh_configs(&mut self) {
        self.display_data.configs = self.store.list().to_vec();
    }

    /// Renders the main application interface.
    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Timer firing every 16ms (60 FPS) to pick up pitch samples, plus
    /// window resizes for pad placement.
    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick),
            iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
        ])
    }

    fn theme(&self) -> Theme {
        if self.display_data.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}
