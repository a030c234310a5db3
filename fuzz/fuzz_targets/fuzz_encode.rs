#![no_main]
use libfuzzer_sys::fuzz_target;
use pixstage::*;

// Descriptor fields and pixel bytes from fuzz input; encoding must
// never panic, and accepted descriptors must produce exactly
// scanline_stride(w) * h output bytes.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let bits_per_pixel = data[0];
    let byte_order = if data[1] & 1 == 0 {
        ByteOrder::LsbFirst
    } else {
        ByteOrder::MsbFirst
    };
    let channels = if data[2] & 1 == 0 {
        Channels::Indexed
    } else {
        let m = u32::from_le_bytes([data[3], data[4], data[5], data[6]]);
        Channels::Rgb {
            r_mask: m & 0xF800,
            g_mask: m & 0x07E0,
            b_mask: m & 0x001F,
        }
    };
    let fmt = PixelFormat {
        bits_per_pixel,
        byte_order,
        channels,
        scanline_pad: u32::from(data[7] % 5),
    };

    let pixels = &data[8..];
    let w = (pixels.len() as u32 % 17) + 1;
    let h = (pixels.len() as u32 / 17 % 13) + 1;
    let need = (w * h) as usize;
    if pixels.len() < need {
        return;
    }

    let img = match LogicalImage::new(w, h, ImageFormat::Indexed8, pixels[..need].to_vec()) {
        Ok(img) => img,
        Err(_) => return,
    };
    let palette = Palette::gray(16);
    let table = ColorTable::identity();

    let result = EncodeRequest::new(&fmt)
        .color_table(&table)
        .encode(&img, Some(&palette), enough::Unstoppable);

    if let Ok(out) = result {
        assert_eq!(out.len(), fmt.scanline_stride(w) * h as usize);
    }
});
