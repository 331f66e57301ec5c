//! Deprecated cvar name translation
//!
//! Old configs still reference cvars that have since been renamed (mostly
//! the `gl_` to `r_`/`gl1_` split). Every public store entry point runs
//! names through this table first so legacy configs keep working.

/// Deprecated name -> canonical name. Canonical names never appear on the
/// left side, so resolution is idempotent.
static RENAMES: &[(&str, &str)] = &[
    ("cd_shuffle", "ogg_shuffle"),
    ("cl_drawfps", "cl_showfps"),
    ("gl_clear", "r_clear"),
    ("gl_consolescale", "r_consolescale"),
    ("gl_customheight", "r_customheight"),
    ("gl_customwidth", "r_customwidth"),
    ("gl_drawentities", "r_drawentities"),
    ("gl_drawworld", "r_drawworld"),
    ("gl_dynamic", "gl1_dynamic"),
    ("gl_farsee", "r_farsee"),
    ("gl_flashblend", "gl1_flashblend"),
    ("gl_fullbright", "r_fullbright"),
    ("gl_hudscale", "r_hudscale"),
    ("gl_lerpmodels", "r_lerpmodels"),
    ("gl_lightlevel", "r_lightlevel"),
    ("gl_lockpvs", "r_lockpvs"),
    ("gl_maxfps", "vid_maxfps"),
    ("gl_menuscale", "r_scale"),
    ("gl_mode", "r_mode"),
    ("gl_modulate", "r_modulate"),
    ("gl_norefresh", "r_norefresh"),
    ("gl_novis", "r_novis"),
    ("gl_overbrightbits", "gl1_overbrightbits"),
    ("gl_palettedtextures", "gl1_palettedtextures"),
    ("gl_particle_att_a", "gl1_particle_att_a"),
    ("gl_particle_att_b", "gl1_particle_att_b"),
    ("gl_particle_att_c", "gl1_particle_att_c"),
    ("gl_particle_max_size", "gl1_particle_max_size"),
    ("gl_particle_min_size", "gl1_particle_min_size"),
    ("gl_particle_size", "gl1_particle_size"),
    ("gl_picmip", "gl1_picmip"),
    ("gl_pointparameters", "gl1_pointparameters"),
    ("gl_polyblend", "gl1_polyblend"),
    ("gl_round_down", "gl1_round_down"),
    ("gl_saturatelightning", "gl1_saturatelightning"),
    ("gl_speeds", "r_speeds"),
    ("gl_stencilshadows", "gl1_stencilshadows"),
    ("gl_stereo", "gl1_stereo"),
    ("gl_stereo_anaglyph_colors", "gl1_stereo_anaglyph_colors"),
    ("gl_stereo_convergence", "gl1_stereo_convergence"),
    ("gl_stereo_separation", "gl1_stereo_separation"),
    ("gl_swapinterval", "r_vsync"),
    ("gl_texturealphamode", "gl1_texturealphamode"),
    ("gl_texturesolidmode", "gl1_texturesolidmode"),
    ("gl_ztrick", "gl1_ztrick"),
    ("intensity", "gl1_intensity"),
];

/// Translate a possibly deprecated cvar name to its canonical form.
///
/// Logs a warning whenever a deprecated name is accessed so users can fix
/// their configs.
pub fn resolve(name: &str) -> &str {
    match RENAMES.binary_search_by_key(&name, |&(old, _)| old) {
        Ok(i) => {
            let (old, new) = RENAMES[i];
            tracing::warn!("cvar {} is deprecated, use {} instead", old, new);
            new
        }
        Err(_) => name,
    }
}

/// Translate without logging. Used where the caller emits its own message.
pub fn resolve_quiet(name: &str) -> &str {
    match RENAMES.binary_search_by_key(&name, |&(old, _)| old) {
        Ok(i) => RENAMES[i].1,
        Err(_) => name,
    }
}
