// ============================================
// Sound Trigger - Демо
// ============================================
// Загружает сцену, проигрывает N случайных звуков на кадровом цикле
// и ждёт пока все плееры будут уничтожены.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use kira::manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ultraviolet::Vec3;

use sound_trigger::audio::kira_host::{ClipLibrary, KiraPlayerFactory, SceneFile};
use sound_trigger::{FrameScheduler, SoundTrigger, TriggerError};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "sound-trigger", about = "Play randomized sounds from a scene file")]
struct Args {
    /// Файл сцены (JSON)
    scene: PathBuf,

    /// Сколько раз сработать
    #[arg(short, long, default_value_t = 5)]
    count: u32,

    /// Пауза между срабатываниями (сек)
    #[arg(short, long, default_value_t = 0.5)]
    interval: f32,

    /// Сид генератора для повторяемых прогонов
    #[arg(long)]
    seed: Option<u64>,
}

fn run(args: Args) -> Result<(), TriggerError> {
    let scene = SceneFile::from_file(&args.scene)?;
    let base_dir = args.scene.parent().map(PathBuf::from).unwrap_or_default();

    let mut library = ClipLibrary::new();
    for name in &scene.trigger.sounds {
        if let Err(e) = library.load_file(name, base_dir.join(name)) {
            log::warn!("{}", e);
        }
    }

    let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
        .map_err(|e| TriggerError::Playback(format!("Failed to create audio manager: {:?}", e)))?;
    let factory = KiraPlayerFactory::new(manager, scene.prefabs.clone());

    let config = scene.trigger.resolve(|name| library.get(name))?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut trigger = SoundTrigger::new(config, factory, rng)?;
    trigger.set_position(Vec3::zero());
    let mut scheduler = FrameScheduler::new();

    let mut fired = 0;
    let mut until_next = 0.0f32;
    let mut last = Instant::now();

    while fired < args.count || !scheduler.is_idle() {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        if fired < args.count {
            until_next -= dt;
            if until_next <= 0.0 {
                if let Some(playback) = trigger.play_randomized_sound(&mut scheduler) {
                    log::info!(
                        "#{}: clip {} volume {:.2} pitch {:.2}",
                        fired, playback.clip_index, playback.volume, playback.pitch
                    );
                }
                fired += 1;
                until_next = args.interval;
            }
        }

        scheduler.tick(dt);
        std::thread::sleep(FRAME);
    }

    log::info!("All players released");
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
