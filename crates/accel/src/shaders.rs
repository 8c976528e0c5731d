/// WGSL compute shader evaluating `sin(x * f) * cos(y * f)` per point.
pub const WAVE_SHADER: &str = r#"
struct Params {
    frequency: f32,
    count: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0)
var<uniform> params: Params;

@group(0) @binding(1)
var<storage, read> points: array<vec2<f32>>;

@group(0) @binding(2)
var<storage, read_write> values: array<f32>;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if (i >= params.count) {
        return;
    }
    let p = points[i];
    values[i] = sin(p.x * params.frequency) * cos(p.y * params.frequency);
}
"#;

/// Threads per workgroup in [`WAVE_SHADER`].
pub const WORKGROUP_SIZE: u32 = 64;
