// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

mod polling;

use std::{error::Error, path::Path, sync::Arc, time::Duration};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::mock;
use crate::clips::{Clip, MemoryClipStore};
use crate::config::SoundConfig;
use crate::session::SoundSession;
use crate::settings::MemorySettings;

pub use polling::eventually;

/// Writes a 16 bit integer WAV file.
pub fn write_wav(
    path: impl AsRef<Path>,
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Installs a test subscriber so log output shows up in failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A session over the mock device, with handles to everything it talks to.
pub struct TestSession {
    pub session: SoundSession,
    pub device: mock::Device,
    pub clips: Arc<MemoryClipStore>,
    pub settings: Arc<MemorySettings>,
}

impl TestSession {
    /// A session with the given growth batch size and two clips: "a" lasting two
    /// seconds and "b" lasting three.
    pub fn new(growth_batch_size: usize) -> TestSession {
        let clips = MemoryClipStore::new()
            .with_clip(Clip::silence("a", Duration::from_secs(2)))
            .with_clip(Clip::silence("b", Duration::from_secs(3)));
        session_with(
            &SoundConfig::new(growth_batch_size),
            clips,
            MemorySettings::new(),
        )
    }
}

/// Builds a session on a fresh mock device.
pub fn session_with(
    config: &SoundConfig,
    clips: MemoryClipStore,
    settings: MemorySettings,
) -> TestSession {
    init_tracing();

    let device = mock::Device::get("mock");
    let clips = Arc::new(clips);
    let settings = Arc::new(settings);
    let session = SoundSession::new(
        config,
        Arc::new(device.clone()),
        clips.clone(),
        settings.clone(),
    )
    .expect("mock session");

    TestSession {
        session,
        device,
        clips,
        settings,
    }
}
