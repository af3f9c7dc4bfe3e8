#[cfg(target_arch = "wasm32")]
pub fn handle_browser_resize(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some(wasm_window) = web_sys::window() else {
        return;
    };
    let Some(target_width) = wasm_window.inner_width().ok().and_then(|w| w.as_f64()) else {
        return;
    };
    let Some(target_height) = wasm_window.inner_height().ok().and_then(|h| h.as_f64()) else {
        return;
    };
    let target_width = target_width as f32;
    let target_height = target_height as f32;

    // Surface dimensions above the guaranteed-supported texture size make
    // wgpu's Surface::configure fail validation on some mobile GPUs.
    const MAX_WIDTH: f32 = 2048.0;
    const MAX_HEIGHT: f32 = 2048.0;

    for mut window in &mut primary_query {
        if (window.resolution.width() - target_width).abs() > f32::EPSILON
            || (window.resolution.height() - target_height).abs() > f32::EPSILON
        {
            let width = target_width.min(MAX_WIDTH);
            let height = target_height.min(MAX_HEIGHT);
            window.resolution.set(width, height);
        }
    }
}
