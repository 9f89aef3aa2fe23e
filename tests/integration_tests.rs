//! Integration tests for the buffer pipeline

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use wavegraph_dsp::input::registry::ListenerRegistry;
use wavegraph_dsp::preprocessing::channel_mixer::ChannelMixMode;
use wavegraph_dsp::{
    analyze_signal, AxisParameters, Edge, GraphConfig, GraphError, GraphParameters, Input,
    InputListener, InputState, ListenerId, MarkerPosition, SignalAnalyzer, SignalBufferState,
    SignalGenerator, StreamInput, TriggerDetection, Waveform, Window,
};

/// 0/1 square wave flipping every `half_period` samples
fn square(n: usize, half_period: usize) -> Vec<f32> {
    (0..n)
        .map(|i| if (i / half_period) % 2 == 0 { 1.0 } else { 0.0 })
        .collect()
}

/// Encode interleaved float samples as an in-memory WAV file
fn wav_bytes(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    bytes
}

/// Decode a WAV file into (interleaved samples, channels, sample_rate)
fn load_wav(bytes: Vec<u8>) -> Result<(Vec<f32>, usize, u32), Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok((samples, spec.channels as usize, spec.sample_rate))
}

/// Counts callbacks and detaches itself after `remove_after` buffers
struct SelfDetaching {
    registry: ListenerRegistry,
    id: Option<ListenerId>,
    remove_after: usize,
    buffers: usize,
    removed: usize,
}

impl InputListener for SelfDetaching {
    fn on_block_size_changed(&mut self, _block_size: usize) {}

    fn on_buffer_updated(&mut self, _buffer: &[f32]) {
        self.buffers += 1;
        if self.buffers == self.remove_after {
            if let Some(id) = self.id {
                assert!(self.registry.remove(id));
            }
        }
    }

    fn on_removed(&mut self) {
        self.removed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_generator(block_size: usize) -> SignalGenerator {
        SignalGenerator::new(8000, block_size, Waveform::Square, 40.0).unwrap()
    }

    #[test]
    fn test_generator_to_analyzer() {
        let config = GraphConfig {
            sample_rate: 8000,
            block_size: 1000,
            ..GraphConfig::default()
        };
        let analyzer = Rc::new(RefCell::new(SignalAnalyzer::new(&config).unwrap()));
        let state = Rc::new(RefCell::new(SignalBufferState::new()));

        let mut generator = square_generator(1000);
        generator.add_input_listener(analyzer.clone()).unwrap();
        generator.add_input_listener(state.clone()).unwrap();
        generator.initialise().unwrap();
        generator.start().unwrap();

        for _ in 0..3 {
            generator.generate().unwrap();
        }

        let a = analyzer.borrow();
        assert_eq!(a.buffers_analyzed(), 3);
        let latest = a.latest().unwrap();
        assert_eq!(latest.frequency_hz, 80);
        assert!(!latest.frequency_is_fallback);
        assert_eq!(state.borrow().buffer(), a.state().buffer());
    }

    #[test]
    fn test_degenerate_buffer_keeps_previous_estimate() {
        let config = GraphConfig {
            sample_rate: 8000,
            ..GraphConfig::default()
        };
        let analyzer = Rc::new(RefCell::new(SignalAnalyzer::new(&config).unwrap()));

        let mut generator = square_generator(1000);
        generator.add_input_listener(analyzer.clone()).unwrap();
        generator.initialise().unwrap();
        generator.start().unwrap();
        generator.generate().unwrap();

        // Flat line below the threshold: no crossings
        generator.set_level(0.0, 0.2).unwrap();
        generator.generate().unwrap();

        let a = analyzer.borrow();
        let latest = a.latest().unwrap();
        assert!(latest.frequency_is_fallback);
        assert_eq!(latest.frequency_hz, 80);
        assert_eq!(a.frequency().last_frequency(), 80);
    }

    #[test]
    fn test_listener_detaches_itself_mid_notification() {
        let mut generator = square_generator(64);
        let registry = generator.listener_registry();

        let detaching = Rc::new(RefCell::new(SelfDetaching {
            registry,
            id: None,
            remove_after: 2,
            buffers: 0,
            removed: 0,
        }));
        let state = Rc::new(RefCell::new(SignalBufferState::new()));

        let id = generator.add_input_listener(detaching.clone()).unwrap();
        detaching.borrow_mut().id = Some(id);
        let state_id = generator.add_input_listener(state.clone()).unwrap();

        generator.initialise().unwrap();
        generator.start().unwrap();
        for _ in 0..4 {
            generator.generate().unwrap();
        }

        let d = detaching.borrow();
        assert_eq!(d.buffers, 2);
        assert_eq!(d.removed, 1);

        // The listener after it still received every buffer
        assert_eq!(state.borrow().buffer().len(), 64);
        assert!(generator.listener_registry().contains(state_id));
        assert!(!generator.listener_registry().contains(id));
    }

    #[test]
    fn test_remove_listener_fires_once() {
        let mut generator = square_generator(32);
        let detaching = Rc::new(RefCell::new(SelfDetaching {
            registry: generator.listener_registry(),
            id: None,
            remove_after: usize::MAX,
            buffers: 0,
            removed: 0,
        }));
        let id = generator.add_input_listener(detaching.clone()).unwrap();

        assert!(generator.remove_input_listener(id));
        assert!(!generator.remove_input_listener(id));
        assert_eq!(detaching.borrow().removed, 1);
    }

    #[test]
    fn test_buffer_size_change_announced_before_buffer() {
        let state = Rc::new(RefCell::new(SignalBufferState::new()));
        let mut generator = square_generator(128);
        generator.add_input_listener(state.clone()).unwrap();
        generator.initialise().unwrap();
        generator.start().unwrap();
        generator.generate().unwrap();
        assert_eq!(state.borrow().buffer().len(), 128);

        generator.set_buffer_size(256).unwrap();
        assert_eq!(state.borrow().block_size(), 256);
        assert!(state.borrow().buffer().is_empty());

        generator.generate().unwrap();
        assert_eq!(state.borrow().buffer().len(), 256);
    }

    #[test]
    fn test_late_listener_hears_block_size() {
        let mut generator = square_generator(100);
        generator.initialise().unwrap();

        let state = Rc::new(RefCell::new(SignalBufferState::new()));
        generator.add_input_listener(state.clone()).unwrap();
        assert_eq!(state.borrow().block_size(), 100);
    }

    #[test]
    fn test_destroy_detaches_everyone() {
        let mut generator = square_generator(16);
        let listeners: Vec<_> = (0..3)
            .map(|_| {
                Rc::new(RefCell::new(SelfDetaching {
                    registry: generator.listener_registry(),
                    id: None,
                    remove_after: usize::MAX,
                    buffers: 0,
                    removed: 0,
                }))
            })
            .collect();
        for l in &listeners {
            generator.add_input_listener(l.clone()).unwrap();
        }
        generator.initialise().unwrap();
        generator.start().unwrap();
        generator.generate().unwrap();

        generator.destroy();
        generator.destroy();

        assert_eq!(generator.state(), InputState::Destroyed);
        assert!(generator.listener_registry().is_empty());
        for l in &listeners {
            assert_eq!(l.borrow().removed, 1);
            assert_eq!(l.borrow().buffers, 1);
        }
        assert!(matches!(generator.start(), Err(GraphError::UsageError(_))));
        assert!(generator
            .add_input_listener(Rc::new(RefCell::new(SignalBufferState::new())))
            .is_err());
    }

    #[test]
    fn test_fixed_rate_input_ignores_rate_change() {
        let mut generator = square_generator(16);
        match generator.set_sample_rate(48000) {
            Err(e @ GraphError::UnsupportedOperation(_)) => assert!(e.is_recoverable()),
            other => panic!("expected UnsupportedOperation, got {:?}", other),
        }
        assert_eq!(generator.sample_rate(), 8000);
    }

    #[test]
    fn test_wav_through_stream_input() {
        // Stereo, both channels carrying the same 40 Hz square at 8 kHz
        let mono = square(4000, 100);
        let interleaved: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
        let (samples, channels, sample_rate) =
            load_wav(wav_bytes(&interleaved, 2, 8000)).unwrap();
        assert_eq!(channels, 2);

        let config = GraphConfig {
            sample_rate,
            block_size: 800,
            window: Some(Window::BlackmanHarris),
            ..GraphConfig::default()
        };
        let analyzer = Rc::new(RefCell::new(SignalAnalyzer::new(&config).unwrap()));

        let mut input = StreamInput::new(sample_rate, 800).unwrap();
        input.add_input_listener(analyzer.clone()).unwrap();
        input.initialise().unwrap();
        input.start().unwrap();

        // Deliver in uneven device-sized chunks
        let mut published = 0;
        for chunk in samples.chunks(2 * 333) {
            published += input
                .push_interleaved(chunk, channels, ChannelMixMode::Average)
                .unwrap();
        }

        assert_eq!(published, 5);
        assert_eq!(input.pending(), 0);
        let a = analyzer.borrow();
        assert_eq!(a.buffers_analyzed(), 5);
        assert_eq!(a.latest().unwrap().frequency_hz, 80);
        assert_eq!(a.latest().unwrap().window, Some(Window::BlackmanHarris));
    }

    #[test]
    fn test_triggered_stream_aligns_blocks() {
        let state = Rc::new(RefCell::new(SignalBufferState::new()));
        let mut input = StreamInput::new(8000, 50)
            .unwrap()
            .with_trigger_detection(TriggerDetection::new(0.5, Edge::Rising, false).unwrap());
        assert!(input.has_trigger_detection());
        input.add_input_listener(state.clone()).unwrap();
        input.initialise().unwrap();
        input.start().unwrap();

        // Starts high: rising edges at 200, 400, 600 and 800
        assert_eq!(input.push(&square(1000, 100)).unwrap(), 4);
        // No edge in the tail; only the last block's worth is kept
        assert_eq!(input.pending(), 50);

        let s = state.borrow();
        assert_eq!(s.buffer().len(), 50);
        assert!(s.buffer().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_stopped_stream_drops_samples() {
        let mut input = StreamInput::new(8000, 4).unwrap();
        assert!(matches!(
            input.push(&[0.0; 4]),
            Err(GraphError::UsageError(_))
        ));

        input.initialise().unwrap();
        assert_eq!(input.push(&[0.0; 8]).unwrap(), 0);
        assert_eq!(input.pending(), 0);

        input.start().unwrap();
        assert_eq!(input.push(&[0.0; 8]).unwrap(), 2);
        input.stop().unwrap();
        assert_eq!(input.push(&[0.0; 8]).unwrap(), 0);
    }

    #[test]
    fn test_analyze_signal_drops_partial_tail() {
        let config = GraphConfig {
            sample_rate: 8000,
            block_size: 800,
            compute_spectrum: false,
            ..GraphConfig::default()
        };
        let results = analyze_signal(&square(2000, 100), &config).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.frequency_hz == 80));
        assert!(results.iter().all(|r| r.peak_frequency_hz.is_none()));

        assert!(matches!(
            analyze_signal(&[], &config),
            Err(GraphError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_marker_over_live_buffer() {
        let graph = GraphParameters::new(
            AxisParameters::linear(0.0, 0.125).unwrap(),
            AxisParameters::linear(-1.0, 1.0).unwrap(),
        )
        .shared();
        let state = Rc::new(RefCell::new(SignalBufferState::new()));

        let mut generator = square_generator(1000);
        generator.add_input_listener(state.clone()).unwrap();
        generator.initialise().unwrap();
        generator.start().unwrap();
        generator.generate().unwrap();

        state.borrow_mut().set_view(0.5, 0.5).unwrap();
        let mut marker = MarkerPosition::new(0xFFFF0000);
        marker.set_position(0.5, 0.5);

        let readout = marker.marker(&state.borrow(), &graph.borrow()).unwrap();
        assert!((readout.x_value - 0.0625).abs() < 1e-6);
        assert!((readout.y_value - 0.5).abs() < 1e-6);

        // Axis change through the shared handle is seen on the next readout
        graph
            .borrow_mut()
            .y
            .set_range(0.0, 4.0)
            .unwrap();
        let readout = marker.marker(&state.borrow(), &graph.borrow()).unwrap();
        assert!((readout.y_value - 3.0).abs() < 1e-6);
    }
}
