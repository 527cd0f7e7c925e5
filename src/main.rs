//! Space Explorer entry point
//!
//! Builds the page, wires clicks to the explorer and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Event, HtmlInputElement, MouseEvent};

    use space_explorer::audio::{Sequencer, WebAudioDevice};
    use space_explorer::explorer::{Activation, Explorer, ExplorerEvent, Phase};
    use space_explorer::starfield;
    use space_explorer::style::style_for;
    use space_explorer::{Catalog, Settings};

    /// App instance holding all state
    struct App {
        explorer: Explorer,
        sequencer: Sequencer<WebAudioDevice>,
        /// Planet whose fact is on screen
        revealed: Option<usize>,
        hud_dirty: bool,
    }

    impl App {
        fn new(settings: &Settings, catalog: Catalog) -> Self {
            let mut sequencer = Sequencer::new(WebAudioDevice::open);
            sequencer.set_volume(settings.volume);
            sequencer.set_muted(settings.muted);
            Self {
                explorer: Explorer::new(catalog),
                sequencer,
                revealed: None,
                hud_dirty: true,
            }
        }

        fn click_planet(&mut self, id: &str, now: f64) {
            match self.explorer.activate(id, now, &mut self.sequencer) {
                Activation::Started { until, .. } => {
                    log::debug!("{} sounding until {:.2}s", id, until)
                }
                Activation::Ignored(reason) => log::debug!("Click on {} ignored: {:?}", id, reason),
            }
            self.handle_events();
        }

        fn next_level(&mut self) {
            if self.explorer.advance_level().is_none() {
                log::debug!("Next level requested before victory");
            }
            self.handle_events();
        }

        /// Advance timers
        fn update(&mut self, now: f64) {
            self.explorer.update(now, &mut self.sequencer);
            self.handle_events();
        }

        fn handle_events(&mut self) {
            for event in self.explorer.drain_events() {
                match event {
                    ExplorerEvent::Discovered { planet } => self.revealed = Some(planet),
                    ExplorerEvent::LevelAdvanced { .. } => self.revealed = None,
                    ExplorerEvent::MelodyStarted { notes, .. } => {
                        log::info!("Victory melody ({} notes)", notes.len())
                    }
                    _ => {}
                }
                self.hud_dirty = true;
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            if !self.hud_dirty {
                return;
            }
            self.hud_dirty = false;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let explorer = &self.explorer;
            let catalog = explorer.catalog();

            set_text(&document, "hud-level", &explorer.level().to_string());
            set_text(
                &document,
                "hud-progress",
                &format!(
                    "{}/{}",
                    explorer.discovered().len(),
                    explorer.discovered().capacity()
                ),
            );

            // Planet rings
            let sounding = match explorer.phase() {
                Phase::PlayingTone { planet, .. } => Some(planet),
                _ => None,
            };
            for (i, planet) in catalog.planets().iter().enumerate() {
                let mut class = String::from("planet");
                if explorer.is_discovered(planet.id.as_str()) {
                    class.push_str(" discovered");
                }
                if sounding == Some(i) {
                    class.push_str(" playing");
                }
                set_class(&document, &planet_element_id(planet.id.as_str()), &class);
            }

            // Fact of the last discovery
            match self.revealed.and_then(|i| catalog.get(i)) {
                Some(planet) => {
                    set_text(&document, "fact-title", &planet.name);
                    set_text(&document, "fact-text", &planet.fact);
                    set_class(&document, "fact-panel", "");
                }
                None => set_class(&document, "fact-panel", "hidden"),
            }

            // Show/hide victory overlay
            set_class(
                &document,
                "victory",
                if explorer.is_victory() { "" } else { "hidden" },
            );
        }
    }

    fn planet_element_id(id: &str) -> String {
        format!("planet-{}", id)
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(document: &Document, id: &str, class: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    /// Page clock in seconds (same origin as animation frame timestamps)
    fn now_secs() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now() / 1000.0)
            .unwrap_or(0.0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Space Explorer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        set_class(&document, "loading", "hidden");

        let settings = Settings::load();
        let catalog = settings.catalog().unwrap_or_else(|e| {
            log::warn!("{} - using the solar system", e);
            Catalog::default()
        });

        build_starfield(&document, &settings);

        let app = Rc::new(RefCell::new(App::new(&settings, catalog)));

        build_planets(&document, app.clone());
        setup_controls(&document, &settings, app.clone());
        setup_next_level(&document, app.clone());
        setup_teardown(app.clone());

        // Start frame loop
        request_animation_frame(app);

        log::info!("Space Explorer running!");
    }

    fn build_starfield(document: &Document, settings: &Settings) {
        if settings.reduced_motion {
            set_class(document, "space", "reduced-motion");
        }

        let Some(field) = document.get_element_by_id("starfield") else {
            log::warn!("No #starfield element");
            return;
        };

        let stars = starfield::generate(settings.star_count, settings.star_seed);
        for star in &stars {
            let Ok(el) = document.create_element("div") else { continue };
            let _ = el.set_attribute("class", "star");
            let _ = el.set_attribute(
                "style",
                &format!(
                    "left:{:.2}%;top:{:.2}%;animation-delay:{:.2}s",
                    star.x_pct, star.y_pct, star.delay
                ),
            );
            let _ = field.append_child(&el);
        }

        log::info!("Placed {} stars", stars.len());
    }

    fn build_planets(document: &Document, app: Rc<RefCell<App>>) {
        let Some(space) = document.get_element_by_id("space") else {
            log::warn!("No #space element");
            return;
        };

        let planets = app.borrow().explorer.catalog().planets().to_vec();
        for planet in planets {
            let Ok(button) = document.create_element("button") else { continue };
            let style = style_for(&planet.name);

            let _ = button.set_attribute("id", &planet_element_id(planet.id.as_str()));
            let _ = button.set_attribute("class", "planet");
            let _ = button.set_attribute("title", &planet.name);
            let _ = button.set_attribute(
                "style",
                &format!(
                    "left:{}%;top:{}%;width:{}px;height:{}px;background:{}",
                    planet.placement.x_pct,
                    planet.placement.y_pct,
                    planet.size_px,
                    planet.size_px,
                    style.background_css()
                ),
            );

            if let Some(rim_css) = style.rim_css() {
                if let Ok(rim) = document.create_element("span") {
                    let _ = rim.set_attribute("class", "rim");
                    let _ = rim.set_attribute("style", &rim_css);
                    let _ = button.append_child(&rim);
                }
            }

            // Click - discover
            {
                let app = app.clone();
                let id = planet.id.to_string();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    app.borrow_mut().click_planet(&id, now_secs());
                });
                let _ = button
                    .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }

            let _ = space.append_child(&button);
        }
    }

    fn setup_controls(document: &Document, settings: &Settings, app: Rc<RefCell<App>>) {
        set_text(document, "volume-value", &settings.volume.to_string());
        set_text(document, "mute-btn", if settings.muted { "Unmute" } else { "Mute" });

        // Volume slider
        if let Some(el) = document.get_element_by_id("volume") {
            if let Ok(input) = el.dyn_into::<HtmlInputElement>() {
                input.set_value(&settings.volume.to_string());

                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
                    let Some(input) = event
                        .target()
                        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    else {
                        return;
                    };
                    if let Ok(volume) = input.value().parse::<u8>() {
                        app.borrow_mut().sequencer.set_volume(volume);
                        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                            set_text(&document, "volume-value", &volume.to_string());
                        }
                    }
                });
                let _ = input
                    .add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Mute toggle
        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let muted = {
                    let mut a = app.borrow_mut();
                    let muted = !a.sequencer.is_muted();
                    a.sequencer.set_muted(muted);
                    muted
                };
                log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_text(&document, "mute-btn", if muted { "Unmute" } else { "Mute" });
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_next_level(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("next-level-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().next_level();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Release the audio device when the page goes away
    fn setup_teardown(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
            app.borrow_mut().sequencer.shutdown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            frame(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.update(time / 1000.0);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Space Explorer (native) starting...");
    log::info!("Native mode runs a headless walkthrough - run with `trunk serve` for the web version");

    headless_walkthrough();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Discover every planet in order against a recording audio device
#[cfg(not(target_arch = "wasm32"))]
fn headless_walkthrough() {
    use space_explorer::audio::{HeadlessDevice, Sequencer};
    use space_explorer::consts::TONE_DURATION;
    use space_explorer::explorer::Phase;
    use space_explorer::{Explorer, Settings, starfield};

    let settings = Settings::load();
    let catalog = match settings.catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("Invalid planet catalog: {}", e);
            return;
        }
    };

    let stars = starfield::generate(settings.star_count, settings.star_seed);
    log::info!("Generated {} stars", stars.len());

    let device = HeadlessDevice::new();
    let mut sequencer = Sequencer::new(device.opener());
    sequencer.set_volume(settings.volume);
    let mut explorer = Explorer::new(catalog);

    let ids: Vec<_> = explorer
        .catalog()
        .planets()
        .iter()
        .map(|p| p.id.clone())
        .collect();

    let mut now = 0.0;
    for id in &ids {
        let activation = explorer.activate(id.as_str(), now, &mut sequencer);
        log::info!("Clicked {}: {:?}", id, activation);

        now += TONE_DURATION;
        explorer.update(now, &mut sequencer);
        for event in explorer.drain_events() {
            log::info!("{:?}", event);
        }
    }

    if let Phase::Celebrating { until } = explorer.phase() {
        explorer.update(until, &mut sequencer);
        for event in explorer.drain_events() {
            log::info!("{:?}", event);
        }
    }

    println!(
        "Discovered {}/{} planets, victory: {}, {} voices played",
        explorer.discovered().len(),
        explorer.catalog().len(),
        explorer.is_victory(),
        device.voices().len()
    );
}
