use image::{Rgb, RgbImage, Rgba, RgbaImage};
use scene_asset_export::jsons::unescape;
use scene_asset_export::{
    CollectedWarnings, ExportSession, ExportSettings, MapCanvas, MapExtent, RenderError,
    RenderJob, RenderSession,
};
use std::fs;

/// Canvas that fills every render with its background and counts paints.
struct SolidCanvas {
    paints: usize,
}

impl MapCanvas for SolidCanvas {
    fn destination_crs(&self) -> String {
        "EPSG:4326".to_string()
    }

    fn layer_ids(&self) -> Vec<String> {
        vec!["base".to_string()]
    }

    fn background_color(&self) -> Rgba<u8> {
        Rgba([200, 220, 240, 255])
    }

    fn extent(&self) -> MapExtent {
        MapExtent::new(135.0, 34.0, 136.0, 35.0)
    }

    fn output_size(&self) -> (u32, u32) {
        (32, 24)
    }

    fn content_image(&mut self) -> Result<RgbImage, RenderError> {
        Ok(RgbImage::from_pixel(32, 24, Rgb([200, 220, 240])))
    }

    fn paint(&mut self, _job: &RenderJob<'_>, _target: &mut RgbaImage) -> Result<(), RenderError> {
        self.paints += 1;
        Ok(())
    }
}

fn lines_with<'a>(text: &'a str, prefix: &str) -> Vec<&'a str> {
    text.lines().filter(|l| l.starts_with(prefix)).collect()
}

#[test]
fn duplicate_map_requests_and_a_missing_file() {
    let extent = MapExtent::new(0.0, 0.0, 100.0, 100.0);
    let mut session = ExportSession::default();
    assert_eq!(session.images().intern_map(100, 100, extent, false), 0);
    assert_eq!(session.images().intern_map(100, 100, extent, false), 0);
    assert_eq!(session.images().intern_file("missing.png"), 1);

    let mut out = Vec::new();
    let mut renderer = RenderSession::new(SolidCanvas { paints: 0 });
    let mut warnings = CollectedWarnings::new();
    let summary = session
        .finish(&mut out, &mut renderer, &mut warnings)
        .expect("finish export");

    let text = String::from_utf8(out).unwrap();
    let images = lines_with(&text, "images[");
    assert_eq!(summary.images, 2);
    assert_eq!(images.len(), 2);
    assert!(images[0].starts_with("images[0] = {width:100,height:100,data:\""));
    assert_eq!(images[1], "images[1] = {data:null};");
    assert_eq!(warnings.len(), 1);
    assert_eq!(renderer.canvas().paints, 1);
}

#[test]
fn full_session_with_settings_file() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let settings_path = dir.path().join("export.json");
    fs::write(&settings_path, r#"{"namespace_prefix": "project"}"#).unwrap();
    let json_path = dir.path().join("labels.json");
    let json_text = "{\"label\": 'O\\'Hare'}\n\t\r";
    fs::write(&json_path, json_text).unwrap();

    let settings = ExportSettings::from_json_file(&settings_path).expect("load settings");
    let mut renderer = RenderSession::from_settings(SolidCanvas { paints: 0 }, &settings);
    let mut session = ExportSession::new(settings);

    let extent = MapExtent::new(0.0, 0.0, 10.0, 10.0);
    let dem = session.materials().map_texture(64, 64, extent, 25, false);
    let roads = session.materials().layer_texture("roads", 64, 64, extent, 0, true);
    let points = session.materials().lambert_smooth("0xff0000", 0, false);
    let invalid = session.materials().lambert_smooth("red", 0, false);
    let canvas = session.images().intern_canvas(false);
    let labels = session.jsons().intern_path(json_path.to_string_lossy());
    assert_eq!((dem, roads, points, invalid, canvas, labels), (0, 1, 2, 3, 0, 0));

    let mut out = Vec::new();
    let mut warnings = CollectedWarnings::new();
    let summary = session
        .finish(&mut out, &mut renderer, &mut warnings)
        .expect("finish export");
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.images, 3);
    assert_eq!(summary.materials, 4);
    assert_eq!(summary.jsons, 1);
    assert!(warnings.is_empty());

    assert!(lines_with(&text, "project.images[0] = {width:32,height:24,").len() == 1);
    assert_eq!(
        lines_with(&text, "project.materials["),
        vec![
            "project.materials[0] = {type:1,i:1,o:0.75,ds:1};",
            "project.materials[1] = {type:1,i:2,ds:1,t:1};",
            "project.materials[2] = {type:0,c:0xff0000};",
            "project.materials[3] = {type:0,c:0};",
        ]
    );

    let json_line = lines_with(&text, "project.jsons[0] = {data:'")[0];
    let escaped = json_line
        .strip_prefix("project.jsons[0] = {data:'")
        .and_then(|rest| rest.strip_suffix("'};"))
        .expect("single-quoted payload");
    assert_eq!(unescape(escaped), json_text);
    assert_eq!(renderer.canvas().paints, 2);
}
