//! Demo: live frequency readout from a generated signal
//!
//! Runs a square-wave generator through a `SignalAnalyzer` and prints the
//! estimate for each buffer, then sweeps the frequency and the block size.
//!
//! Run with `RUST_LOG=debug` to see the pipeline's log output.

use std::cell::RefCell;
use std::rc::Rc;
use wavegraph_dsp::{
    GraphConfig, GraphParameters, Input, MarkerPosition, SignalAnalyzer, SignalGenerator, Waveform,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let config = GraphConfig {
        sample_rate: 8000,
        block_size: 1024,
        ..GraphConfig::default()
    };
    let analyzer = Rc::new(RefCell::new(SignalAnalyzer::new(&config)?));

    let mut generator = SignalGenerator::new(
        config.sample_rate,
        config.block_size,
        Waveform::Square,
        50.0,
    )?;
    generator.add_input_listener(analyzer.clone())?;
    generator.initialise()?;
    generator.start()?;

    println!("Frequency sweep (zero-crossing estimate counts both edges):");
    for frequency in [50.0, 100.0, 200.0, 400.0] {
        generator.set_frequency(frequency)?;
        generator.generate()?;

        let a = analyzer.borrow();
        if let Some(result) = a.latest() {
            println!(
                "  {:>6.1} Hz generated -> {:>4} Hz estimate, spectrum peak {:?} Hz",
                frequency, result.frequency_hz, result.peak_frequency_hz
            );
        }
    }

    generator.set_buffer_size(2048)?;
    generator.generate()?;
    println!(
        "Block size now {} samples",
        analyzer.borrow().state().buffer().len()
    );

    // Marker readout over the last buffer, zoomed into the top half
    let graph = GraphParameters::waveform(2048.0 / config.sample_rate as f32, 0.0, 1.0)?;
    analyzer.borrow_mut().state_mut().set_view(0.5, 0.5)?;
    let readout =
        MarkerPosition::new(0xFFFF0000).locate(0.5, 0.5, analyzer.borrow().state(), &graph);
    println!(
        "Marker at centre: t={:.4} s, level={:.3}",
        readout.x_value, readout.y_value
    );

    generator.destroy();
    Ok(())
}
