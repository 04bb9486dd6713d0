use argh::FromArgs;
use motio::{
    image::{Image, ImageSize, Rect},
    tracking::{MotionHistory, MotionHistoryConfig},
};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

#[derive(FromArgs)]
/// Track two synthetic objects with a motion history and log the moving regions
struct Args {
    /// path to a JSON motion history configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// the number of frames to generate
    #[argh(option, short = 'n', default = "30")]
    frames: u64,

    /// the frames per second of the synthetic video
    #[argh(option, short = 'f', default = "15")]
    fps: u64,

    /// the smallest region area reported, in pixels
    #[argh(option, default = "50")]
    min_area: usize,
}

const FRAME_SIZE: ImageSize = ImageSize {
    width: 320,
    height: 240,
};

/// Render frame `k`: one block moving right, one moving up, on a flat background.
fn render_frame(k: usize) -> Result<Image<u8, 1>, Box<dyn std::error::Error>> {
    let mut frame = Image::from_size_val(FRAME_SIZE, 32)?;

    let blocks = [
        Rect {
            x: (20 + 4 * k) % (FRAME_SIZE.width - 24),
            y: 40,
            width: 24,
            height: 24,
        },
        Rect {
            x: 220,
            y: 200 - (3 * k) % 180,
            width: 30,
            height: 20,
        },
    ];

    for block in blocks {
        for y in block.y..block.y + block.height {
            for x in block.x..block.x + block.width {
                if let Some(px) = frame.get_mut([y, x, 0]) {
                    *px = 220;
                }
            }
        }
    }

    Ok(frame)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => MotionHistoryConfig::from_json_file(path)?,
        None => MotionHistoryConfig::default(),
    };
    log::info!("motion history config: {config:?}");

    let start = Instant::now();
    let mut history = MotionHistory::with_start_time(config, start)?;
    let frame_period = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);

    for k in 0..args.frames {
        let frame = render_frame(k as usize)?;
        history.update_at(&frame, start + frame_period * k as u32)?;

        let global = history.global_motion_info()?;
        log::info!(
            "frame {k}: {} moving pixels, global direction {:.1} deg",
            global.motion_pixel_count,
            global.angle
        );

        let segmentation = history.motion_components()?;
        for component in segmentation.components {
            if component.area < args.min_area {
                continue;
            }

            let info = history.motion_info(component.rect)?;
            // skip regions where almost nothing moved in this frame
            if info.motion_pixel_count < component.rect.area() / 20 {
                continue;
            }

            log::info!(
                "  region {} at {:?}: area {}, direction {:.1} deg",
                component.label,
                component.rect,
                component.area,
                info.angle
            );
        }
    }

    Ok(())
}
