//! Metaballs entry point
//!
//! Native builds run the simulation headless on a CPU raster surface; the
//! browser build draws into a WebGPU canvas on a repeating timer.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, WheelEvent};

    use metaballs::renderer::LineRenderState;
    use metaballs::sim::{SimState, Speed};
    use metaballs::{FrameDriver, Settings, StartupError};

    /// Everything one timer tick touches
    struct App {
        state: SimState,
        driver: FrameDriver,
        surface: LineRenderState,
        refresh_ms: u32,
    }

    impl App {
        fn tick(&mut self) {
            match self.driver.run_frame(&mut self.state, &mut self.surface) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = self.surface.size;
                    self.surface.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    /// Repeating browser timer whose period follows the speed setting
    struct Timer {
        handle: Option<i32>,
        callback: Option<Closure<dyn FnMut()>>,
    }

    type Shared<T> = Rc<RefCell<T>>;

    fn reschedule(app: &Shared<App>, timer: &Shared<Timer>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut guard = timer.borrow_mut();
        let timer = &mut *guard;
        if let Some(handle) = timer.handle.take() {
            window.clear_interval_with_handle(handle);
        }

        let interval = {
            let app = app.borrow();
            app.state.speed.tick_interval_ms(app.refresh_ms)
        };

        if let Some(callback) = timer.callback.as_ref() {
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                interval as i32,
            ) {
                Ok(handle) => {
                    timer.handle = Some(handle);
                    log::debug!("Tick interval set to {} ms", interval);
                }
                Err(e) => log::error!("Failed to start timer: {:?}", e),
            }
        }
    }

    fn change_speed(app: &Shared<App>, timer: &Shared<Timer>, update: impl FnOnce(&mut Speed)) {
        let changed = {
            let mut app = app.borrow_mut();
            let before = app.state.speed;
            update(&mut app.state.speed);
            app.state.speed != before
        };
        if changed {
            log::debug!("Speed now {}", app.borrow().state.speed.get());
            reschedule(app, timer);
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Shared<App>, timer: Shared<Timer>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard: +/= faster, - slower
        {
            let app = app.clone();
            let timer = timer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "+" | "=" => change_speed(&app, &timer, Speed::increase),
                    "-" | "_" => change_speed(&app, &timer, Speed::decrease),
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Scroll wheel
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                let delta = event.delta_y();
                if delta != 0.0 {
                    change_speed(&app, &timer, |speed| speed.apply_wheel(delta));
                }
            });
            let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn load_settings(canvas: &HtmlCanvasElement) -> Result<Settings, StartupError> {
        match canvas.get_attribute("data-settings") {
            Some(json) => {
                let settings = Settings::from_json(&json)?;
                log::info!("Loaded settings from canvas attribute");
                Ok(settings)
            }
            None => Ok(Settings::default()),
        }
    }

    pub async fn run() -> Result<(), StartupError> {
        let window = web_sys::window().ok_or(StartupError::Surface("no window".into()))?;
        let document = window
            .document()
            .ok_or(StartupError::Surface("no document".into()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or(StartupError::Surface("no #canvas element".into()))?
            .dyn_into()
            .map_err(|_| StartupError::Surface("#canvas is not a canvas".into()))?;

        // Size the backing store to device pixels
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let mut settings = load_settings(&canvas)?;
        settings.width = width;
        settings.height = height;
        settings.validate()?;

        let seed = settings.resolved_seed(js_sys::Date::now() as u64);
        log::info!("Settings: {:?}", settings);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| StartupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| StartupError::NoAdapter)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let surface = LineRenderState::new(surface, &adapter, width, height).await?;

        let mut state =
            SimState::try_new(width, height, settings.ball_count, settings.cell_size, seed)?;
        state.speed = Speed::new(settings.speed);
        log::info!(
            "{} balls, seed {}, {} saddles",
            state.balls.len(),
            state.seed,
            settings.saddle.as_str()
        );

        // Screensaver: no pointer over the canvas
        if let Err(e) = canvas.style().set_property("cursor", "none") {
            log::warn!("Failed to hide cursor: {:?}", e);
        }

        let app = Rc::new(RefCell::new(App {
            state,
            driver: FrameDriver::new(settings.extractor()),
            surface,
            refresh_ms: settings.refresh_ms,
        }));

        let timer = Rc::new(RefCell::new(Timer {
            handle: None,
            callback: None,
        }));
        {
            let app = app.clone();
            timer.borrow_mut().callback = Some(Closure::<dyn FnMut()>::new(move || {
                app.borrow_mut().tick();
            }));
        }

        setup_input_handlers(&canvas, app.clone(), timer.clone());
        reschedule(&app, &timer);

        log::info!("Metaballs running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Metaballs starting...");
    if let Err(e) = wasm_app::run().await {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{Instant, SystemTime, UNIX_EPOCH};

    use metaballs::renderer::RasterSurface;
    use metaballs::sim::{SimState, Speed};
    use metaballs::{FrameDriver, Settings, StartupError};

    /// Frames between progress log lines
    const LOG_EVERY: u64 = 60;

    pub fn run(settings: &Settings) -> Result<(), StartupError> {
        let fallback_seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let seed = settings.resolved_seed(fallback_seed);
        log::info!("Settings: {:?}", settings);

        let mut state = SimState::try_new(
            settings.width,
            settings.height,
            settings.ball_count,
            settings.cell_size,
            seed,
        )?;
        state.speed = Speed::new(settings.speed);
        let mut surface = RasterSurface::try_new(settings.width, settings.height)?;
        let driver = FrameDriver::new(settings.extractor());
        let interval = state.speed.tick_interval(settings.refresh_ms);

        let (width, height) = surface.size();
        log::info!(
            "{} balls on a {}x{} canvas, {}x{} field grid, seed {}, {} saddles, tick every {:?}",
            state.balls.len(),
            width,
            height,
            state.field.cols(),
            state.field.rows(),
            state.seed,
            settings.saddle.as_str(),
            interval
        );

        let started = Instant::now();
        while settings.frames.is_none_or(|limit| state.frame_count < limit) {
            let tick_start = Instant::now();
            let Ok(stats) = driver.run_frame(&mut state, &mut surface);

            if state.frame_count % LOG_EVERY == 0 {
                let elapsed = started.elapsed().as_secs_f64();
                log::info!(
                    "frame {}: {} segments, {} saddle cells, {:.1} fps",
                    state.frame_count,
                    stats.segments,
                    stats.saddle_cells,
                    state.frame_count as f64 / elapsed.max(f64::EPSILON)
                );
            }

            if let Some(rest) = interval.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        log::info!(
            "Stopped after {} frames in {:.2?}",
            state.frame_count,
            started.elapsed()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use metaballs::Settings;
    use metaballs::settings::{USAGE, wants_help};

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if wants_help(&args) {
        print!("{USAGE}");
        return;
    }

    let settings = match Settings::from_args(args) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            eprintln!("metaballs: {e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    log::info!("Metaballs (native, headless) starting...");
    if let Err(e) = native::run(&settings) {
        log::error!("Startup failed: {}", e);
        eprintln!("metaballs: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
