//! 构建时生成应用图标 icon.ico（卡片底色的圆角方块 + 白色横条）并嵌入 Windows 可执行文件

const CARD: [u8; 4] = [204, 153, 204, 255];
const INK: [u8; 4] = [255, 255, 255, 255];

fn make_rgba_card(size: u32) -> Vec<u8> {
    let s = size as f32;
    let inset = s * 0.08;
    let radius = s * 0.18;
    let (min, max) = (inset, s - inset);
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let px = (x as f32) + 0.5;
            let py = (y as f32) + 0.5;
            // 圆角：到最近内角圆心的距离
            let cx = px.clamp(min + radius, max - radius);
            let cy = py.clamp(min + radius, max - radius);
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            let inside = px >= min && px <= max && py >= min && py <= max && d <= radius;
            let on_bar = (py - s * 0.5).abs() <= s * 0.07 && px >= s * 0.28 && px <= s * 0.72;
            let pixel = match (inside, on_bar) {
                (true, true) => INK,
                (true, false) => CARD,
                _ => [0, 0, 0, 0],
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    rgba
}

fn main() {
    #[cfg(windows)]
    {
        let manifest_dir = std::path::PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
        let icon_path = manifest_dir.join("icon.ico");

        let mut icon_dir = ico::IconDir::new(ico::ResourceType::Icon);
        for &size in &[16u32, 32u32, 48u32, 256u32] {
            let image = ico::IconImage::from_rgba_data(size, size, make_rgba_card(size));
            let entry = ico::IconDirEntry::encode(&image).expect("encode icon entry");
            icon_dir.add_entry(entry);
        }

        let mut file = std::fs::File::create(&icon_path).expect("create icon.ico");
        icon_dir.write(&mut file).expect("write icon.ico");

        let mut res = winres::WindowsResource::new();
        res.set_icon("icon.ico");
        if let Err(e) = res.compile() {
            eprintln!("winres: {} (未安装 Windows SDK/rc.exe 时可忽略，图标不会嵌入 exe)", e);
        }
    }
}
