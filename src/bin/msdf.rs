use msdf_core::{generate_glyph, Options};

fn usage() -> ! {
    eprintln!("usage: msdf <font.ttf> <char> [out.png]");
    std::process::exit(1);
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let font_path = args.next().unwrap_or_else(|| usage());
    let char_arg = args.next().unwrap_or_else(|| usage());
    let out_path = args.next().unwrap_or_else(|| "out.png".to_string());

    let codepoint = char_arg.chars().next().unwrap_or_else(|| usage());

    let font_data = std::fs::read(&font_path).expect("failed to read font file");
    let face = ttf_parser::Face::parse(&font_data, 0).expect("failed to parse font");

    let options = Options::default();
    let (bitmap, metrics) = generate_glyph(&face, codepoint, &options).expect("failed to generate glyph");

    log::info!(
        "generated {codepoint:?}: {}x{} advance={:.3} bearing=({:.3},{:.3})",
        bitmap.width,
        bitmap.height,
        metrics.advance_width,
        metrics.bearing_x,
        metrics.bearing_y
    );

    let image = image::RgbImage::from_raw(bitmap.width, bitmap.height, bitmap.pixels).expect("bitmap byte length mismatch");
    image.save(&out_path).expect("failed to write output image");

    println!("wrote {out_path}");
}
