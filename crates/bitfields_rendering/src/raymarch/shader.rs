//! WGSL source for the ray-march pass.
//!
//! Bindings (group 0):
//!
//! | binding | resource                          |
//! |---------|-----------------------------------|
//! | 0       | `RayMarchUniforms`                |
//! | 1       | occupancy, `texture_3d<u32>`      |
//! | 2       | color ids, `texture_3d<u32>`      |
//! | 3       | palette, `array<vec4<f32>, 64>`   |
//! | 4       | shadow depth, `texture_depth_2d`  |

/// Complete ray-march shader: full-screen triangle vertex stage plus the
/// marching fragment stage.
pub const RAY_MARCH_WGSL: &str = r#"
struct RayMarchUniforms {
    inv_projection: mat4x4<f32>,
    camera_world: mat4x4<f32>,
    light_matrix: mat4x4<f32>,
    camera_position: vec4<f32>,
    volume_min: vec4<f32>,
    volume_max: vec4<f32>,
    volume_dims: vec4<u32>,
    light_dir: vec4<f32>,
    shading: vec4<f32>,
    resolution: vec4<f32>,
};

struct Palette {
    colors: array<vec4<f32>, 64>,
};

@group(0) @binding(0) var<uniform> u: RayMarchUniforms;
@group(0) @binding(1) var occupancy_tex: texture_3d<u32>;
@group(0) @binding(2) var color_id_tex: texture_3d<u32>;
@group(0) @binding(3) var<uniform> palette: Palette;
@group(0) @binding(4) var shadow_tex: texture_depth_2d;

const NDC_RAY_DEPTH: f32 = 0.5;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    // (-1,-1), (3,-1), (-1,3) covers the viewport with one triangle
    let x = f32(i32(index & 1u) * 4 - 1);
    let y = f32(i32(index >> 1u) * 4 - 1);
    return vec4<f32>(x, y, 0.0, 1.0);
}

fn in_volume(cell: vec3<i32>) -> bool {
    let dims = vec3<i32>(u.volume_dims.xyz);
    return all(cell >= vec3<i32>(0)) && all(cell < dims);
}

fn occupancy(cell: vec3<i32>) -> f32 {
    if (!in_volume(cell)) {
        return 0.0;
    }
    return f32(textureLoad(occupancy_tex, cell, 0).r);
}

fn shadow_visibility(p: vec3<f32>) -> f32 {
    if (u.shading.w < 0.5) {
        return 1.0;
    }
    let clip = u.light_matrix * vec4<f32>(p, 1.0);
    if (clip.w <= 0.0) {
        return 1.0;
    }
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv >= vec2<f32>(1.0)) || ndc.z > 1.0) {
        return 1.0;
    }
    let size = vec2<f32>(textureDimensions(shadow_tex));
    let depth = textureLoad(shadow_tex, vec2<i32>(uv * size), 0);
    if (ndc.z - u.light_dir.w > depth) {
        return u.shading.z;
    }
    return 1.0;
}

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    // Pixel → NDC, y up
    let ndc = vec2<f32>(
        frag.x * u.resolution.z * 2.0 - 1.0,
        1.0 - frag.y * u.resolution.w * 2.0,
    );
    var view = u.inv_projection * vec4<f32>(ndc, NDC_RAY_DEPTH, 1.0);
    view = view / view.w;
    let rd = normalize((u.camera_world * vec4<f32>(view.xyz, 0.0)).xyz);
    let ro = u.camera_position.xyz;

    // Slab clip
    let inv = 1.0 / rd;
    let t0 = (u.volume_min.xyz - ro) * inv;
    let t1 = (u.volume_max.xyz - ro) * inv;
    let tmin = min(t0, t1);
    let tmax = max(t0, t1);
    let t_near = max(max(tmin.x, tmin.y), tmin.z);
    let t_far = min(min(tmax.x, tmax.y), tmax.z);
    if (t_far < max(t_near, 0.0)) {
        discard;
    }

    let cell_size = u.volume_min.w;
    let step_size = u.volume_max.w;
    var t = max(t_near, 0.0);

    for (var i = 0u; i < u.volume_dims.w; i = i + 1u) {
        if (t > t_far) {
            break;
        }
        let p = ro + rd * t;
        let cell = vec3<i32>(floor((p - u.volume_min.xyz) / cell_size));
        if (occupancy(cell) > 0.0) {
            let gradient = vec3<f32>(
                occupancy(cell + vec3<i32>(1, 0, 0)) - occupancy(cell - vec3<i32>(1, 0, 0)),
                occupancy(cell + vec3<i32>(0, 1, 0)) - occupancy(cell - vec3<i32>(0, 1, 0)),
                occupancy(cell + vec3<i32>(0, 0, 1)) - occupancy(cell - vec3<i32>(0, 0, 1)),
            );
            var n = rd;
            if (dot(gradient, gradient) > 0.0) {
                n = normalize(gradient);
            }
            let diff = max(dot(n, u.light_dir.xyz), 0.0);

            let id = min(textureLoad(color_id_tex, cell, 0).r, 63u);
            let base = palette.colors[id].rgb;
            var color = base * (u.shading.x + u.shading.y * diff);
            color = color * shadow_visibility(p);
            return vec4<f32>(pow(color, vec3<f32>(1.0 / 2.2)), 1.0);
        }
        t = t + step_size;
    }

    discard;
}
"#;

/// Returns the ray-march shader source.
#[must_use]
pub fn shader_source() -> &'static str {
    RAY_MARCH_WGSL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_entry_points_present() {
        let src = shader_source();
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_main"));
        assert!(src.contains("array<vec4<f32>, 64>"), "palette size must match MAX_PALETTE");
    }

    #[test]
    fn test_shader_validates() {
        crate::test_support::validate_wgsl("ray march", shader_source());
    }
}
