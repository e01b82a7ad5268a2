use std::path::Path;

use console::Style;
use tessview_core::config::{LayoutKind, SceneConfig};
use tessview_core::illustration::Illustration;
use tessview_core::panel::Panel;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    kind: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            kind: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn layout_name(layout: &LayoutKind) -> String {
    match layout {
        LayoutKind::SingleCamera { camera } => format!("single camera {camera}"),
        LayoutKind::FourCameras => "four cameras".into(),
        LayoutKind::CameraOfCcds { camera } => format!("camera {camera} CCDs"),
        LayoutKind::Generic => "generic".into(),
    }
}

fn on_off(s: &Styles, label: &str, enabled: bool) {
    let state = if enabled {
        s.kind.apply_to("shared")
    } else {
        s.disabled.apply_to("per panel")
    };
    println!("    {:<12}{}", s.label.apply_to(label), state);
}

pub fn print_scene_summary(scene: &SceneConfig, illustration: &Illustration, output: &Path) {
    let s = Styles::new();
    let figure = illustration.figure();

    println!();
    println!("  {}", s.title.apply_to("tessview"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(8)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Layout"),
        s.kind.apply_to(layout_name(&scene.layout))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Figure"),
        s.value.apply_to(format!("{}x{}", figure.width, figure.height))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Panels"));
    for panel in illustration.panels() {
        let detail = match panel {
            Panel::Imshow(p) => {
                let (rows, cols) = p.sequence().shape();
                format!(
                    "{} frames of {cols}x{rows}, frame {}, {}",
                    p.sequence().len(),
                    p.frame().name,
                    p.config().processing
                )
            }
            Panel::Zoom(p) => format!(
                "{}x{} from '{}' at ({:.1}, {:.1})",
                p.config().size.0,
                p.config().size.1,
                p.source(),
                p.config().position.0,
                p.config().position.1
            ),
            Panel::Timeseries(p) => format!("{} light curve(s)", p.series().count()),
        };
        println!(
            "    {:<12}{} {}",
            s.label.apply_to(panel.name()),
            s.kind.apply_to(panel.kind()),
            s.value.apply_to(detail)
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Colour"));
    on_off(&s, "Scale", scene.illustration.share_colorscale);
    on_off(&s, "Colorbar", scene.illustration.share_colorbar);
    println!();
}
