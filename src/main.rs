/*
 * Flocking Viewer
 *
 * Opens a nannou window running the flock with interactive parameters.
 * Set RUST_LOG (e.g. RUST_LOG=flocking=debug) to see simulation logs.
 */

use flocking::viewer;

fn main() {
    init_tracing();
    nannou::app(viewer::model).update(viewer::update).run();
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
