#![allow(dead_code)]

use assetflow::Config;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const INDEX_HTML: &str = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Site</title>\n    <link rel=\"stylesheet\" href=\"css/style.css\">\n  </head>\n  <body>\n    <!-- hero banner -->\n    <section class=\"hero\">\n      <h1 id=\"headline\">  Hello  </h1>\n    </section>\n    <script src=\"js/scripts.js\"></script>\n  </body>\n</html>\n";

pub const ABOUT_HTML: &str = "<html><body><p class=\"about\">About us</p></body></html>\n";

/// A throwaway project with sources for every category
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().unwrap(),
        };

        project.write("src/index.html", INDEX_HTML);
        project.write("src/pages/about.html", ABOUT_HTML);

        project.write(
            "src/css/main.scss",
            "@import 'components';\n\nbody {\n  margin: 0;\n}\n",
        );
        project.write(
            "src/css/_components.scss",
            "$accent: #336699;\n\n.hero {\n  color: $accent;\n  h1 { font-weight: bold; }\n}\n\n.modal-unused {\n  display: none;\n}\n",
        );
        project.write("src/css/extra.css", ".about { padding: 4px; }\n");

        project.write("src/js/libs/zlib.js", "window.first = \"LIB_MARKER\";\n");
        project.write("src/js/app.js", "window.second = \"APP_MARKER\";\n");
        project.write("src/js/external/track.js", "window.third = \"EXTERNAL_MARKER\";\n");

        project.write_bytes("src/img/gradient.png", &encode(ImageFormat::Png));
        project.write_bytes("src/img/photos/gradient.jpg", &encode(ImageFormat::Jpeg));
        project.write("src/img/icon.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"/>");

        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        self.write_bytes(relative, contents.as_bytes());
    }

    pub fn write_bytes(&self, relative: &str, contents: &[u8]) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn read_bytes(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative)).unwrap()
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::new(Config::with_root(self.root()).unwrap())
    }

    /// Every file beneath `relative`, as sorted root-relative paths
    pub fn files_under(&self, relative: &str) -> Vec<String> {
        let base = self.path(relative);
        let mut found = Vec::new();
        collect(&base, &base, &mut found);
        found.sort();
        found
    }
}

fn collect(base: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(base, &path, found);
        } else {
            let relative = path.strip_prefix(base).unwrap();
            found.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

pub fn gradient() -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(48, 48, |x, y| {
        Rgb([(x * 5) as u8, (y * 5) as u8, 90])
    }))
}

pub fn encode(format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient().write_to(&mut buf, format).unwrap();
    buf.into_inner()
}
