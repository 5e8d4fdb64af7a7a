//! Rendered sections fed back through the validator.
//!
//! A section that validates once must validate again from the same text and
//! produce the same model.

use chrono::{DateTime, FixedOffset, TimeZone};

use dockergen_core::{BuildInfo, DockerfileValues};
use dockergen_dockerfile::{validate, validate_bytes};
use dockergen_renderer::{Renderer, TemplateRegistry};

const GO_TEMPLATE: &str = "\
FROM {{ BuilderImage }} AS builder
WORKDIR /src
COPY . .
RUN <<EOF
set -e
go build -o /out/{{ AppName }} {{ MainPackage }}
EOF

FROM {{ RuntimeImage }}
LABEL org.opencontainers.image.version=\"{{ AppVersion }}\"
RUN echo \"<<{{ AppName }}>>\" > /etc/motd
COPY --from=builder /out/{{ AppName }} /usr/local/bin/{{ AppName }}
ENTRYPOINT [\"/usr/local/bin/{{ AppName }}\"]";

fn fixed_time() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .unwrap()
}

fn values() -> DockerfileValues {
    DockerfileValues {
        app_name: "api".into(),
        app_version: "1.0.0".into(),
        main_package: "./cmd/server".into(),
        builder_image: "golang:1.22".into(),
        runtime_image: "alpine:3.19".into(),
    }
}

fn renderer() -> Renderer {
    let registry = TemplateRegistry::from_sources([("go.Dockerfile", GO_TEMPLATE)]).unwrap();
    Renderer::new(registry, BuildInfo::new("1.2.3", "abc123"))
}

#[test]
fn rendered_section_revalidates_to_the_same_model() {
    let text = renderer().render_at("go", &values(), fixed_time()).unwrap();

    let first = validate(&text).expect("rendered section validates");
    let second = validate(&text).expect("same text validates again");
    assert_eq!(first, second);
    assert_eq!(first.stages.len(), 2);
    assert_eq!(first.stages[1].base, "alpine:3.19");
}

#[test]
fn section_bytes_validate_like_the_text() {
    let text = renderer().render_at("./go.Dockerfile", &values(), fixed_time()).unwrap();
    assert_eq!(validate(&text).unwrap(), validate_bytes(text.as_bytes()).unwrap());
}
