// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
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

//! Hardware output through rodio. Each channel is its own sink on a shared output stream.

use std::{fmt, sync::Arc, thread};

use rodio::buffer::SamplesBuffer;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{OutputStream, OutputStreamHandle, PlayError, Sink, Source};
use tracing::{error, info};

use crate::clips::Clip;
use crate::error::SoundError;

/// The device name that selects the host's default output.
const DEFAULT_DEVICE_NAME: &str = "default";

/// An audio output device. The underlying stream lives on a dedicated thread because it
/// can't be sent between threads; dropping the device shuts that thread down.
pub struct Device {
    name: String,
    handle: OutputStreamHandle,
    /// Dropped with the device, which releases the stream thread.
    _shutdown: crossbeam_channel::Sender<()>,
}

impl Device {
    /// Opens the output device with the given name.
    pub fn get(name: &str) -> Result<Device, SoundError> {
        let (handle_tx, handle_rx) = crossbeam_channel::bounded(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);

        let device_name = name.to_string();
        thread::Builder::new()
            .name("soundpool-output".to_string())
            .spawn(move || match open_stream(&device_name) {
                Ok((stream, handle)) => {
                    if handle_tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // Blocks until the device is dropped.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(e));
                }
            })
            .map_err(|e| SoundError::Device(format!("unable to start output thread: {}", e)))?;

        let handle = handle_rx
            .recv()
            .map_err(|e| SoundError::Device(format!("output thread exited: {}", e)))??;

        info!(device = name, "Opened audio output");
        Ok(Device {
            name: name.to_string(),
            handle,
            _shutdown: shutdown_tx,
        })
    }
}

fn open_stream(name: &str) -> Result<(OutputStream, OutputStreamHandle), SoundError> {
    if name == DEFAULT_DEVICE_NAME {
        return OutputStream::try_default().map_err(|e| SoundError::Device(e.to_string()));
    }

    let host = rodio::cpal::default_host();
    let device = host
        .output_devices()
        .map_err(|e| SoundError::Device(e.to_string()))?
        .find(|device| device.name().is_ok_and(|device_name| device_name == name))
        .ok_or_else(|| SoundError::Device(format!("no output device named {}", name)))?;

    OutputStream::try_from_device(&device).map_err(|e| SoundError::Device(e.to_string()))
}

impl crate::audio::Device for Device {
    fn open_channel(&self) -> Result<Box<dyn crate::audio::Channel>, SoundError> {
        let handle = self.handle.clone();
        let channel = Channel::new(Arc::new(move || Sink::try_new(&handle)))
            .map_err(|e| SoundError::Device(e.to_string()))?;
        Ok(Box::new(channel))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Creates sinks on the output stream.
type SinkFactory = Arc<dyn Fn() -> Result<Sink, PlayError> + Send + Sync>;

/// A channel backed by a rodio sink.
struct Channel {
    new_sink: SinkFactory,
    sink: Sink,
    clip: Option<Clip>,
    volume: f32,
    looping: bool,
    /// Set by `pause`, cleared by anything that stops playback. A stopped sink keeps its
    /// own pause flag and queue length until the mixer next polls it, so it can't be
    /// asked whether there's anything to resume.
    paused: bool,
}

impl Channel {
    fn new(new_sink: SinkFactory) -> Result<Channel, PlayError> {
        let sink = new_sink()?;
        Ok(Channel {
            new_sink,
            sink,
            clip: None,
            volume: 1.0,
            looping: false,
            paused: false,
        })
    }

    /// Queues the assigned clip on a fresh sink. A stopped sink can't be reused, so
    /// every restart starts over with a new one.
    fn restart(&mut self) {
        self.paused = false;
        let Some(clip) = &self.clip else {
            return;
        };

        self.sink.stop();
        match (self.new_sink)() {
            Ok(sink) => self.sink = sink,
            Err(e) => {
                error!(err = %e, clip = clip.name(), "Unable to create sink");
                return;
            }
        }

        let source = SamplesBuffer::new(
            clip.channel_count(),
            clip.sample_rate(),
            clip.samples().to_vec(),
        );
        self.sink.set_volume(self.volume.clamp(0.0, 1.0));
        if self.looping {
            self.sink.append(source.repeat_infinite());
        } else {
            self.sink.append(source);
        }
        self.sink.play();
    }
}

impl crate::audio::Channel for Channel {
    fn set_clip(&mut self, clip: Option<Clip>) {
        if clip.is_none() {
            self.sink.stop();
            self.paused = false;
        }
        self.clip = clip;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn play(&mut self) {
        if self.paused {
            self.paused = false;
            self.sink.play();
        } else {
            self.restart();
        }
    }

    fn pause(&mut self) {
        if !self.sink.empty() {
            self.paused = true;
            self.sink.pause();
        }
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.paused = false;
    }

    fn is_playing(&self) -> bool {
        !self.paused && !self.sink.empty() && !self.sink.is_paused()
    }
}
