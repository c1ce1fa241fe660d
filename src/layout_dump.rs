use crate::layout::{CloudLayout, LayoutStats};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub words: Vec<WordDump>,
    pub dropped: Vec<String>,
    pub stats: LayoutStats,
}

#[derive(Debug, Serialize)]
pub struct WordDump {
    pub text: String,
    pub weight: f32,
    pub font_size: f32,
    pub rotation_deg: f32,
    pub color: String,
    /// Padded box, top-left plus size.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center: [f32; 2],
}

impl LayoutDump {
    pub fn from_layout(layout: &CloudLayout) -> Self {
        let words = layout
            .words
            .iter()
            .map(|word| {
                let (cx, cy) = word.center();
                WordDump {
                    text: word.text.clone(),
                    weight: word.weight,
                    font_size: word.font_size,
                    rotation_deg: word.rotation.to_degrees(),
                    color: word.color.clone(),
                    x: word.x,
                    y: word.y,
                    width: word.box_width,
                    height: word.box_height,
                    center: [cx, cy],
                }
            })
            .collect();

        LayoutDump {
            width: layout.canvas.width,
            height: layout.canvas.height,
            words,
            dropped: layout.dropped.clone(),
            stats: layout.stats,
        }
    }
}

pub fn layout_dump_json(layout: &CloudLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: &Path, layout: &CloudLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
