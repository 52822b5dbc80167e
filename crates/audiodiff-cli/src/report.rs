//! Human-readable and JSON rendering of comparison results.

use audiodiff_core::ComparisonResult;
use std::path::Path;

/// Verbal tier for a correlation coefficient.
fn correlation_rating(r: f32) -> &'static str {
    if r > 0.95 {
        "Excellent"
    } else if r > 0.8 {
        "Good"
    } else if r > 0.5 {
        "Fair"
    } else {
        "Poor"
    }
}

/// Verbal tier for the overall similarity score.
fn score_rating(score: f32) -> &'static str {
    if score > 95.0 {
        "Identical"
    } else if score > 85.0 {
        "Very Similar"
    } else if score > 70.0 {
        "Similar"
    } else if score > 50.0 {
        "Different"
    } else {
        "Very Different"
    }
}

/// Print the sectioned comparison report.
pub fn print_report(result: &ComparisonResult, file1: &Path, file2: &Path, verbose: bool) {
    println!("\n{}", "=".repeat(60));
    println!("AUDIO COMPARISON REPORT");
    println!("{}", "=".repeat(60));

    println!("\nFile 1: {}", file1.display());
    println!("File 2: {}", file2.display());
    println!("\nSample Rate: {} Hz", result.sample_rate);
    println!(
        "Duration: {:.2}s vs {:.2}s",
        result.duration1_secs, result.duration2_secs
    );

    if result.aligned {
        println!("\n--- Alignment ---");
        println!("Offset: {:.1} ms", result.alignment_offset_ms);
        println!("Correlation: {:.4}", result.alignment_correlation);
    }

    println!("\n--- Amplitude ---");
    println!("{:20} {:>12} {:>12} {:>12}", "", "File 1", "File 2", "Diff");
    println!(
        "{:20} {:>12.1} {:>12.1} {:>+12.1}",
        "Peak (dB)", result.amplitude1.peak_db, result.amplitude2.peak_db, result.peak_diff_db
    );
    println!(
        "{:20} {:>12.1} {:>12.1} {:>+12.1}",
        "RMS (dB)", result.amplitude1.rms_db, result.amplitude2.rms_db, result.rms_diff_db
    );
    println!(
        "{:20} {:>12.1} {:>12.1}",
        "Crest Factor (dB)",
        result.amplitude1.crest_factor_db,
        result.amplitude2.crest_factor_db
    );
    println!(
        "{:20} {:>12.1} {:>12.1}",
        "Dynamic Range (dB)",
        result.amplitude1.dynamic_range_db,
        result.amplitude2.dynamic_range_db
    );

    println!("\n--- Spectral ---");
    println!("{:20} {:>12} {:>12} {:>12}", "", "File 1", "File 2", "Diff");
    println!(
        "{:20} {:>12.0} {:>12.0} {:>+12.0}",
        "Centroid (Hz)",
        result.spectral1.centroid_hz,
        result.spectral2.centroid_hz,
        result.spectral_centroid_diff_hz
    );
    println!(
        "{:20} {:>12.0} {:>12.0}",
        "Bandwidth (Hz)", result.spectral1.bandwidth_hz, result.spectral2.bandwidth_hz
    );
    println!(
        "{:20} {:>12.0} {:>12.0}",
        "Rolloff (Hz)", result.spectral1.rolloff_hz, result.spectral2.rolloff_hz
    );
    println!(
        "{:20} {:>12.4} {:>12.4}",
        "Flatness", result.spectral1.flatness, result.spectral2.flatness
    );

    println!("\n--- Timing ---");
    println!("{:20} {:>12} {:>12}", "", "File 1", "File 2");
    println!(
        "{:20} {:>12.1} {:>12.1}",
        "First Transient (ms)",
        result.timing1.first_transient_ms,
        result.timing2.first_transient_ms
    );
    println!(
        "{:20} {:>12} {:>12}",
        "Num Transients", result.timing1.num_transients, result.timing2.num_transients
    );

    println!("\n--- Correlation ---");
    println!(
        "Waveform:  {:>8.4}  {}",
        result.waveform_correlation,
        correlation_rating(result.waveform_correlation)
    );
    println!(
        "Envelope:  {:>8.4}  {}",
        result.envelope_correlation,
        correlation_rating(result.envelope_correlation)
    );
    println!(
        "Spectral:  {:>8.4}  {}",
        result.spectral_correlation,
        correlation_rating(result.spectral_correlation)
    );

    println!("\n--- Overall ---");
    println!(
        "Similarity Score: {:.1}/100 ({})",
        result.similarity_score,
        score_rating(result.similarity_score)
    );

    if result.issues.is_empty() {
        println!("\n  No significant issues detected.");
    } else {
        println!("\n--- Issues Detected ---");
        for issue in &result.issues {
            println!("  - {issue}");
        }
    }

    if verbose {
        println!("\n--- Detailed Stats ---");
        println!("File 1 DC Offset: {:.6}", result.amplitude1.dc_offset);
        println!("File 2 DC Offset: {:.6}", result.amplitude2.dc_offset);
        for (label, stats) in [("File 1", &result.spectral1), ("File 2", &result.spectral2)] {
            if !stats.dominant_freqs.is_empty() {
                let freqs: Vec<String> = stats
                    .dominant_freqs
                    .iter()
                    .map(|f| format!("{f:.0}Hz"))
                    .collect();
                println!("{label} Dominant Frequencies: {}", freqs.join(", "));
            }
        }
        for (label, env) in [("File 1", &result.envelope1), ("File 2", &result.envelope2)] {
            println!(
                "{label} Envelope: attack {:.1} ms, decay {:.1} ms, sustain {:.2}, release {:.1} ms",
                env.attack_time_ms, env.decay_time_ms, env.sustain_level, env.release_time_ms
            );
        }
    }

    println!("\n{}", "=".repeat(60));
}

/// Assemble the full result as a JSON value.
pub fn to_json(result: &ComparisonResult, file1: &Path, file2: &Path) -> serde_json::Value {
    let amplitude = |stats: &audiodiff_core::AmplitudeStats| {
        serde_json::json!({
            "peak_db": stats.peak_db,
            "rms_db": stats.rms_db,
            "crest_factor_db": stats.crest_factor_db,
            "dynamic_range_db": stats.dynamic_range_db,
            "dc_offset": stats.dc_offset,
        })
    };
    let spectral = |stats: &audiodiff_core::SpectralStats| {
        serde_json::json!({
            "centroid_hz": stats.centroid_hz,
            "bandwidth_hz": stats.bandwidth_hz,
            "rolloff_hz": stats.rolloff_hz,
            "flatness": stats.flatness,
            "dominant_freqs": stats.dominant_freqs,
        })
    };
    let envelope = |stats: &audiodiff_core::EnvelopeStats| {
        serde_json::json!({
            "attack_time_ms": stats.attack_time_ms,
            "decay_time_ms": stats.decay_time_ms,
            "sustain_level": stats.sustain_level,
            "release_time_ms": stats.release_time_ms,
        })
    };
    let timing = |stats: &audiodiff_core::TimingStats| {
        serde_json::json!({
            "first_transient_ms": stats.first_transient_ms,
            "num_transients": stats.num_transients,
            "transient_times_ms": stats.transient_times_ms,
        })
    };

    serde_json::json!({
        "file1": file1.to_string_lossy(),
        "file2": file2.to_string_lossy(),
        "sample_rate": result.sample_rate,
        "duration1_secs": result.duration1_secs,
        "duration2_secs": result.duration2_secs,
        "aligned": result.aligned,
        "alignment_offset_ms": result.alignment_offset_ms,
        "alignment_correlation": result.alignment_correlation,
        "amplitude1": amplitude(&result.amplitude1),
        "amplitude2": amplitude(&result.amplitude2),
        "spectral1": spectral(&result.spectral1),
        "spectral2": spectral(&result.spectral2),
        "envelope1": envelope(&result.envelope1),
        "envelope2": envelope(&result.envelope2),
        "timing1": timing(&result.timing1),
        "timing2": timing(&result.timing2),
        "waveform_correlation": result.waveform_correlation,
        "envelope_correlation": result.envelope_correlation,
        "spectral_correlation": result.spectral_correlation,
        "peak_diff_db": result.peak_diff_db,
        "rms_diff_db": result.rms_diff_db,
        "spectral_centroid_diff_hz": result.spectral_centroid_diff_hz,
        "similarity_score": result.similarity_score,
        "issues": result.issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiodiff_core::{CompareOptions, SignalBuffer, compare};
    use std::f32::consts::TAU;

    fn sample_result() -> ComparisonResult {
        let samples: Vec<f32> = (0..48000)
            .map(|i| (TAU * 440.0 * i as f32 / 48000.0).sin())
            .collect();
        let a = SignalBuffer::new(samples, 48000);
        compare(&a, &a.clone(), &CompareOptions::default())
    }

    #[test]
    fn test_rating_tiers() {
        assert_eq!(correlation_rating(0.99), "Excellent");
        assert_eq!(correlation_rating(0.9), "Good");
        assert_eq!(correlation_rating(0.6), "Fair");
        assert_eq!(correlation_rating(0.1), "Poor");
        assert_eq!(score_rating(99.0), "Identical");
        assert_eq!(score_rating(90.0), "Very Similar");
        assert_eq!(score_rating(75.0), "Similar");
        assert_eq!(score_rating(60.0), "Different");
        assert_eq!(score_rating(10.0), "Very Different");
    }

    #[test]
    fn test_json_carries_all_sections() {
        let result = sample_result();
        let value = to_json(&result, Path::new("a.wav"), Path::new("b.wav"));

        assert_eq!(value["file1"], "a.wav");
        assert_eq!(value["sample_rate"], 48000);
        assert!(value["amplitude1"]["peak_db"].is_number());
        assert!(value["spectral2"]["dominant_freqs"].is_array());
        assert!(value["envelope1"]["attack_time_ms"].is_number());
        assert!(value["timing2"]["num_transients"].is_number());
        assert!(value["issues"].is_array());
        assert!(value["similarity_score"].as_f64().unwrap() >= 99.0);
    }
}
