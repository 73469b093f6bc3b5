// End-to-end builds over a temporary project tree
mod common;

use assetflow::build::{self, Outcome};
use assetflow::{Category, Profile};
use common::{ABOUT_HTML, INDEX_HTML, Project};
use image::ImageFormat;

#[tokio::test]
async fn test_each_entry_point_writes_one_bundle_per_kind() {
    for profile in [Profile::Development, Profile::Demo, Profile::Production] {
        let project = Project::new();
        let out = if profile == Profile::Development { "dist" } else { "build" };

        let reports = build::build(profile, project.config()).await.unwrap();
        assert_eq!(reports.len(), 4);

        assert_eq!(project.files_under(&format!("{out}/css")), ["style.css"]);
        assert_eq!(project.files_under(&format!("{out}/js")), ["scripts.js"]);
    }
}

#[tokio::test]
async fn test_development_copies_without_optimizing() {
    let project = Project::new();
    build::build(Profile::Development, project.config()).await.unwrap();

    assert_eq!(project.read("dist/index.html"), INDEX_HTML);
    assert_eq!(project.read("dist/pages/about.html"), ABOUT_HTML);

    for image in ["gradient.png", "photos/gradient.jpg", "icon.svg"] {
        assert_eq!(
            project.read_bytes(&format!("dist/img/{image}")),
            project.read_bytes(&format!("src/img/{image}")),
            "{image} changed in development"
        );
    }

    assert_eq!(
        project.read("dist/js/scripts.js"),
        "window.first = \"LIB_MARKER\";\n\nwindow.second = \"APP_MARKER\";\n"
    );

    let css = project.read("dist/css/style.css");
    assert!(css.contains(".modal-unused"), "development must not purge");
    assert!(css.contains(".hero h1"));
    assert!(css.contains('\n'), "development must not minify");
}

#[tokio::test]
async fn test_development_keeps_repeated_rules() {
    let project = Project::new();
    project.write("src/css/repeat.css", ".about{margin-top:0}\n.about{padding:1px}\n");
    build::build(Profile::Development, project.config()).await.unwrap();

    let css = project.read("dist/css/style.css");
    assert_eq!(css.matches(".about {").count(), 3, "{css}");
    assert!(css.contains("margin-top: 0;"), "{css}");
}

#[tokio::test]
async fn test_production_purges_unreferenced_selectors() {
    let project = Project::new();
    build::production(project.config()).await.unwrap();

    let css = project.read("build/css/style.css");
    assert!(css.contains(".hero"));
    assert!(css.contains(".about"));
    assert!(!css.contains("modal-unused"));
    assert!(!css.trim_end().contains('\n'), "production css is minified");
}

#[tokio::test]
async fn test_libs_come_first() {
    for profile in [Profile::Development, Profile::Production] {
        let project = Project::new();
        build::build(profile, project.config()).await.unwrap();

        let out = if profile == Profile::Development { "dist" } else { "build" };
        let js = project.read(&format!("{out}/js/scripts.js"));
        let lib = js.find("LIB_MARKER").unwrap();
        let app = js.find("APP_MARKER").unwrap();
        assert!(lib < app, "{profile}: libs must precede app code");
    }
}

#[tokio::test]
async fn test_production_keeps_library_globals() {
    let project = Project::new();
    project.write(
        "src/js/libs/menu.js",
        "function toggleMenu() {\n  document.body.classList.toggle('open');\n}\nvar MenuLib = { version: 2 };\n",
    );
    build::production(project.config()).await.unwrap();

    let js = project.read("build/js/scripts.js");
    assert!(js.contains("function toggleMenu("), "{js}");
    assert!(js.contains("MenuLib="), "{js}");
}

#[tokio::test]
async fn test_external_scripts_only_dropped_in_development() {
    let project = Project::new();
    build::build(Profile::Development, project.config()).await.unwrap();
    assert!(!project.read("dist/js/scripts.js").contains("EXTERNAL_MARKER"));

    build::build(Profile::Production, project.config()).await.unwrap();
    assert!(project.read("build/js/scripts.js").contains("EXTERNAL_MARKER"));
}

#[tokio::test]
async fn test_production_minifies_scripts_and_markup() {
    let project = Project::new();
    build::production(project.config()).await.unwrap();

    let js = project.read("build/js/scripts.js");
    assert!(js.contains("LIB_MARKER"));
    assert!(!js.contains("window.first = "), "production scripts are minified");

    let html = project.read("build/index.html");
    assert!(html.len() < INDEX_HTML.len());
    assert!(!html.contains("hero banner"));
    assert!(project.path("build/pages/about.html").exists());
}

#[tokio::test]
async fn test_production_images_never_grow() {
    let project = Project::new();
    project.write_bytes("src/img/anim.gif", b"GIF89a\x01\x00\x01\x00\x00\x00\x00;");
    build::production(project.config()).await.unwrap();

    for image in ["gradient.png", "photos/gradient.jpg"] {
        let original = project.read_bytes(&format!("src/img/{image}"));
        let optimized = project.read_bytes(&format!("build/img/{image}"));
        assert!(optimized.len() <= original.len(), "{image} grew");
    }
    assert!(image::load_from_memory_with_format(
        &project.read_bytes("build/img/gradient.png"),
        ImageFormat::Png
    )
    .is_ok());
    for copied in ["icon.svg", "anim.gif"] {
        assert_eq!(
            project.read_bytes(&format!("build/img/{copied}")),
            project.read_bytes(&format!("src/img/{copied}")),
            "{copied} should be copied as-is"
        );
    }
}

#[tokio::test]
async fn test_demo_and_production_markup_identical() {
    let project = Project::new();

    build::demo(project.config()).await.unwrap();
    let demo_index = project.read_bytes("build/index.html");
    let demo_about = project.read_bytes("build/pages/about.html");

    build::production(project.config()).await.unwrap();
    assert_eq!(project.read_bytes("build/index.html"), demo_index);
    assert_eq!(project.read_bytes("build/pages/about.html"), demo_about);
}

#[tokio::test]
async fn test_clean_removes_stale_output() {
    let project = Project::new();
    project.write("dist/old.html", "stale");
    project.write("dist/css/old.css", "stale");
    project.write("build/js/old.js", "stale");

    build::build(Profile::Development, project.config()).await.unwrap();
    assert!(!project.path("dist/old.html").exists());
    assert!(!project.path("dist/css/old.css").exists());
    assert!(project.path("build/js/old.js").exists());

    build::build(Profile::Production, project.config()).await.unwrap();
    assert!(!project.path("build/js/old.js").exists());
}

#[tokio::test]
async fn test_sass_error_aborts_styles_only() {
    let project = Project::new();
    project.write("src/css/broken.scss", ".oops { color: ");

    let reports = build::build(Profile::Production, project.config()).await.unwrap();

    let styles = reports.iter().find(|r| r.category == Category::Styles).unwrap();
    assert!(matches!(styles.outcome, Outcome::Aborted(_)));
    assert!(!project.path("build/css/style.css").exists());
    assert!(project.path("build/js/scripts.js").exists());
    assert!(project.path("build/index.html").exists());
}

#[tokio::test]
async fn test_script_syntax_error_fails_production() {
    let project = Project::new();
    project.write("src/js/bad.js", "function (");

    let result = build::build(Profile::Production, project.config()).await;
    assert!(matches!(result, Err(assetflow::BuildError::Transform(_))));
    // siblings still ran to completion
    assert!(project.path("build/index.html").exists());
}

#[tokio::test]
async fn test_missing_categories_are_not_errors() {
    let project = Project::new();
    std::fs::remove_dir_all(project.path("src/img")).unwrap();
    std::fs::remove_dir_all(project.path("src/js")).unwrap();

    build::build(Profile::Development, project.config()).await.unwrap();
    assert!(project.files_under("dist/img").is_empty());
    assert!(!project.path("dist/js/scripts.js").exists());
}
