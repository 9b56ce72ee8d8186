use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write an RGB24 frame as an 8-bit PNG.
pub fn write_png(path: &Path, width: u32, height: u32, rgb: &[u8]) -> Result<(), png::EncodingError> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip() {
        let path = std::env::temp_dir().join("moto_screenshot_test.png");
        let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| i as u8).collect();
        write_png(&path, 4, 3, &pixels).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(&buf[..info.buffer_size()], &pixels[..]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn short_buffer_is_refused() {
        let path = std::env::temp_dir().join("moto_screenshot_short.png");
        assert!(write_png(&path, 4, 4, &[0; 5]).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
