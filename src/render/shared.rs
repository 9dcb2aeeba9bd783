pub(crate) const SHADER: &str = r#"
struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    params: vec4<f32>,
    hemi_sky: vec4<f32>,
    hemi_ground: vec4<f32>,
    rim_direction: vec4<f32>,
    rim_color: vec4<f32>,
    ground_direction: vec4<f32>,
    ground_color: vec4<f32>,
    spot_position: vec4<f32>,
    spot_direction: vec4<f32>,
    spot_color: vec4<f32>,
    spot_cone: vec4<f32>,
    env_sky: vec4<f32>,
    env_ground: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    emissive: vec4<f32>,
    surface: vec4<f32>,
    coat: vec4<f32>,
    sheen: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    return out;
}

fn shininess(roughness: f32) -> f32 {
    let r = clamp(roughness, 0.04, 1.0);
    return clamp(2.0 / (r * r * r * r) - 2.0, 1.0, 2048.0);
}

// Blinn-Phong lobe for one light arriving along `l` with radiance `radiance`.
fn shade(n: vec3<f32>, v: vec3<f32>, l: vec3<f32>, radiance: vec3<f32>, diffuse: vec3<f32>, specular: vec3<f32>) -> vec3<f32> {
    let n_dot_l = max(dot(n, l), 0.0);
    if (n_dot_l <= 0.0) {
        return vec3<f32>(0.0);
    }
    let h = normalize(l + v);
    let power = shininess(object.surface.x);
    let spec = pow(max(dot(n, h), 0.0), power) * (power + 8.0) / 25.1327;
    var lit = diffuse + specular * spec;

    let coat = object.coat.x;
    if (coat > 0.0) {
        let coat_power = shininess(object.coat.y);
        let coat_spec = pow(max(dot(n, h), 0.0), coat_power) * (coat_power + 8.0) / 25.1327;
        lit = lit + vec3<f32>(0.04 * coat * coat_spec);
    }

    let sheen = object.sheen.rgb;
    let grazing = pow(1.0 - max(dot(n, v), 0.0), 1.0 / max(object.sheen.w, 0.05));
    lit = lit + sheen * grazing * 0.25;

    return lit * radiance * n_dot_l;
}

fn aces(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

fn encode_srgb(linear: vec3<f32>) -> vec3<f32> {
    let low = linear * 12.92;
    let high = 1.055 * pow(linear, vec3<f32>(1.0 / 2.4)) - 0.055;
    return select(high, low, linear <= vec3<f32>(0.0031308));
}

fn finish(radiance: vec3<f32>, alpha: f32) -> vec4<f32> {
    var mapped = aces(radiance * globals.params.x);
    if (globals.params.y > 0.5) {
        mapped = encode_srgb(mapped);
    }
    return vec4<f32>(mapped, alpha);
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let base = object.color.rgb;
    let alpha = object.color.a;
    if (object.surface.w < 0.5) {
        return finish(base, alpha);
    }

    var n = normalize(input.normal);
    if (!front) {
        n = -n;
    }
    let v = normalize(globals.camera_position.xyz - input.world_pos);
    let metalness = clamp(object.surface.y, 0.0, 1.0);
    let diffuse = base * (1.0 - metalness);
    let specular = mix(vec3<f32>(0.04), base, metalness);

    let up = 0.5 * n.y + 0.5;
    var radiance = mix(globals.hemi_ground.rgb, globals.hemi_sky.rgb, up) * diffuse;

    radiance = radiance + shade(n, v, globals.rim_direction.xyz, globals.rim_color.rgb, diffuse, specular);
    radiance = radiance + shade(n, v, globals.ground_direction.xyz, globals.ground_color.rgb, diffuse, specular);

    let to_spot = globals.spot_position.xyz - input.world_pos;
    let dist = length(to_spot);
    let l = to_spot / max(dist, 0.0001);
    let cone = smoothstep(globals.spot_cone.x, globals.spot_cone.y, dot(-l, globals.spot_direction.xyz));
    var falloff = 1.0;
    if (globals.spot_position.w > 0.0) {
        falloff = pow(clamp(1.0 - dist / globals.spot_position.w, 0.0, 1.0), globals.spot_direction.w);
    }
    radiance = radiance + shade(n, v, l, globals.spot_color.rgb * cone * falloff, diffuse, specular);

    if (globals.params.z > 0.5) {
        let env = mix(globals.env_ground.rgb, globals.env_sky.rgb, up) * object.surface.z;
        let gloss = 1.0 - clamp(object.surface.x, 0.0, 1.0);
        radiance = radiance + env * (diffuse + specular * gloss);
    }

    radiance = radiance + object.emissive.rgb;
    return finish(radiance, alpha);
}
"#;
