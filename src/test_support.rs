//! Fixtures shared by unit tests.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use u_numflow::special;

/// Fresh directory under the system temp dir, unique per call.
pub fn unique_temp_dir(suffix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let dir = std::env::temp_dir().join(format!(
        "spc_capability_{suffix}_{}_{}",
        std::process::id(),
        nonce
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Write `contents` to `<fresh temp dir>/<name>` and return the path.
pub fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let path = unique_temp_dir(name.replace('.', "_").as_str()).join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

/// CSV text with a `layer` column numbered from 1 and one signal column.
pub fn series_csv(signal: &str, values: &[f64]) -> String {
    let mut out = format!("layer,{signal}\n");
    for (i, v) in values.iter().enumerate() {
        out.push_str(&format!("{},{v}\n", i + 1));
    }
    out
}

/// Evenly spaced standard-normal quantiles, scaled to `N(mu, sigma)`.
///
/// Interleaved so the series does not look sorted when plotted against layer.
pub fn normal_quantiles(n: usize, mu: f64, sigma: f64) -> Vec<f64> {
    let sorted: Vec<f64> = (1..=n)
        .map(|i| {
            let p = (i as f64 - 0.5) / n as f64;
            mu + sigma * special::inverse_normal_cdf(p)
        })
        .collect();
    let mut out = Vec::with_capacity(n);
    let (mut lo, mut hi) = (0usize, n);
    while lo < hi {
        out.push(sorted[lo]);
        lo += 1;
        if lo < hi {
            hi -= 1;
            out.push(sorted[hi]);
        }
    }
    out
}

/// `0..=9` repeated, the shape of a discrete uniform sample.
pub fn uniform_digits(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i % 10) as f64).collect()
}
