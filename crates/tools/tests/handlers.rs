//! Handler behavior against a real directory tree with scripted checker and
//! completion service.

use pagewright_config::ProjectConfig;
use pagewright_core::testing::SequentialMockProvider;
use pagewright_core::{
    AgentError, ColorProperty, ExecutionContext, Preposition, ToolInstructions, ToolRegistry,
    ValidationStatus,
};
use pagewright_tools::{
    ComponentGenerator, DocumentStore, GeneratorSource, LlmComponentGenerator, default_registry,
};
use pagewright_validator::SelfHealingValidator;
use pagewright_validator::testing::ScriptedChecker;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const HERO: &str = r#"export default function Hero() {
  return (
    <section className="bg-white py-24">
      <h1 className="text-4xl font-bold text-gray-900">Ship faster</h1>
      <button className="rounded bg-red-500 px-4 text-white">Get started</button>
    </section>
  );
}
"#;

const DEMO: &str = r#"export default function Demo() {
  return <iframe className="aspect-video w-full" src="https://www.youtube.com/embed/old000" />;
}
"#;

const PAGE: &str = r#"import Hero from "@/components/Hero";
import Demo from "@/components/Demo";

export default function Page() {
  return (
    <main>
      <Hero />
      <Demo />
    </main>
  );
}
"#;

const PRICING: &str = "export default function Pricing() {\n  return <section>Pricing</section>;\n}";

struct Fixture {
    dir: tempfile::TempDir,
    checker: Arc<ScriptedChecker>,
    provider: Arc<SequentialMockProvider>,
    factory_calls: Arc<AtomicUsize>,
    registry: ToolRegistry,
}

impl Fixture {
    fn new(checker: ScriptedChecker, replies: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let components = dir.path().join("src/components");
        std::fs::create_dir_all(&components).unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(components.join("Hero.tsx"), HERO).unwrap();
        std::fs::write(components.join("Demo.tsx"), DEMO).unwrap();
        std::fs::write(dir.path().join("src/app/page.tsx"), PAGE).unwrap();

        let checker = Arc::new(checker);
        let provider = Arc::new(SequentialMockProvider::texts(replies));
        let store = Arc::new(DocumentStore::new(dir.path(), &ProjectConfig::default()));
        let validator = Arc::new(SelfHealingValidator::new(
            checker.clone(),
            provider.clone(),
            "mock-model",
            dir.path(),
        ));

        let factory_calls = Arc::new(AtomicUsize::new(0));
        let calls = factory_calls.clone();
        let generator_provider = provider.clone();
        let generator = Arc::new(GeneratorSource::lazy(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let generator: Arc<dyn ComponentGenerator> =
                Arc::new(LlmComponentGenerator::new(generator_provider.clone(), "mock-model"));
            Ok(generator)
        }));

        let registry = default_registry(store, validator, generator, true);
        Self {
            dir,
            checker,
            provider,
            factory_calls,
            registry,
        }
    }

    fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(relative)).unwrap()
    }

    fn exists(&self, relative: &str) -> bool {
        Path::new(&self.dir.path().join(relative)).exists()
    }

    async fn run(&self, instructions: ToolInstructions) -> Result<pagewright_core::ToolOutcome, AgentError> {
        self.run_with(instructions, ExecutionContext::default()).await
    }

    async fn run_with(
        &self,
        instructions: ToolInstructions,
        ctx: ExecutionContext,
    ) -> Result<pagewright_core::ToolOutcome, AgentError> {
        self.registry
            .get(instructions.tool_name())
            .unwrap()
            .execute(&instructions, &ctx)
            .await
    }
}

#[test]
fn registry_holds_all_five_tools() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    assert_eq!(
        fx.registry.names(),
        vec!["color-update", "content-edit", "delete", "video-embed", "visual-edit"]
    );
}

#[tokio::test]
async fn color_update_rewrites_and_validates() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    let outcome = fx
        .run(ToolInstructions::ColorUpdate {
            component: "Hero".into(),
            selector: Some("button".into()),
            property: ColorProperty::Background,
            old_color: None,
            color: "blue".into(),
        })
        .await
        .unwrap();

    assert_eq!(outcome.file_path.as_deref(), Some("src/components/Hero.tsx"));
    assert_eq!(outcome.transformations, 1);
    assert_eq!(outcome.validation.unwrap().status, ValidationStatus::Pass);
    assert!(fx.read("src/components/Hero.tsx").contains("rounded bg-blue-600 px-4"));
    assert_eq!(fx.checker.invocations(), 1);
}

#[tokio::test]
async fn color_update_without_match_fails_untouched() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    let err = fx
        .run(ToolInstructions::ColorUpdate {
            component: "Hero".into(),
            selector: None,
            property: ColorProperty::Border,
            old_color: None,
            color: "red".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "HandlerFailure");
    assert_eq!(fx.read("src/components/Hero.tsx"), HERO);
    assert_eq!(fx.checker.invocations(), 0);
}

#[tokio::test]
async fn content_edit_replaces_literal_text() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    fx.run(ToolInstructions::ContentEdit {
        component: "Hero".into(),
        selector: None,
        old_value: Some("Get started".into()),
        new_value: "Start free".into(),
    })
    .await
    .unwrap();
    assert!(fx.read("src/components/Hero.tsx").contains(">Start free</button>"));
}

#[tokio::test]
async fn content_edit_by_selector() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    fx.run(ToolInstructions::ContentEdit {
        component: "Hero".into(),
        selector: Some("headline".into()),
        old_value: None,
        new_value: "Launch today".into(),
    })
    .await
    .unwrap();
    assert!(fx.read("src/components/Hero.tsx").contains(">Launch today</h1>"));
}

#[tokio::test]
async fn content_edit_unknown_selector_fails() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    let err = fx
        .run(ToolInstructions::ContentEdit {
            component: "Hero".into(),
            selector: Some("table".into()),
            old_value: None,
            new_value: "x".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "HandlerFailure");
    assert!(err.to_string().contains("element selector not found"));
}

#[tokio::test]
async fn edits_soft_pass_when_fixes_run_out() {
    let broken = "export default function Hero( {";
    let fx = Fixture::new(ScriptedChecker::always_fail("error TS1005"), &[broken, broken, broken]);
    let outcome = fx
        .run(ToolInstructions::ContentEdit {
            component: "Hero".into(),
            selector: None,
            old_value: Some("Ship faster".into()),
            new_value: "Ship today".into(),
        })
        .await
        .unwrap();

    let report = outcome.validation.unwrap();
    assert_eq!(report.status, ValidationStatus::SoftPass);
    assert_eq!(report.fixes, 3);
    assert_eq!(fx.provider.call_count(), 3);
}

#[tokio::test]
async fn context_can_force_hard_fail_for_edits() {
    let fx = Fixture::new(ScriptedChecker::always_fail("error TS1005"), &[HERO, HERO, HERO]);
    let err = fx
        .run_with(
            ToolInstructions::ContentEdit {
                component: "Hero".into(),
                selector: None,
                old_value: Some("Ship faster".into()),
                new_value: "Ship today".into(),
            },
            ExecutionContext {
                soft_fail: Some(false),
                ..ExecutionContext::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "ValidationExhausted");
}

#[tokio::test]
async fn delete_removes_file_and_page_usage() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    let outcome = fx
        .run(ToolInstructions::Delete {
            component: "Demo".into(),
        })
        .await
        .unwrap();

    assert_eq!(outcome.transformations, 2);
    assert!(!fx.exists("src/components/Demo.tsx"));
    let page = fx.read("src/app/page.tsx");
    assert!(!page.contains("Demo"));
    assert!(page.contains("<Hero />"));
}

#[tokio::test]
async fn delete_of_missing_component_fails() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    let err = fx
        .run(ToolInstructions::Delete {
            component: "Testimonials".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "HandlerFailure");
    assert_eq!(fx.read("src/app/page.tsx"), PAGE);
}

#[tokio::test]
async fn delete_rejects_path_escape() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    let err = fx
        .run(ToolInstructions::Delete {
            component: "../app/page".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "Document");
    assert!(fx.exists("src/app/page.tsx"));
}

#[tokio::test]
async fn video_embed_normalizes_watch_url() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[]);
    fx.run(ToolInstructions::VideoEmbed {
        component: "Demo".into(),
        selector: None,
        video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
    })
    .await
    .unwrap();
    let demo = fx.read("src/components/Demo.tsx");
    assert!(demo.contains(r#"src="https://www.youtube.com/embed/dQw4w9WgXcQ""#));
    assert!(!demo.contains("old000"));
}

#[tokio::test]
async fn visual_edit_creates_and_registers_below_anchor() {
    let fenced = format!("```tsx\n{PRICING}\n```");
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[fenced.as_str()]);

    let outcome = fx
        .run(ToolInstructions::VisualEdit {
            component_name: "Pricing".into(),
            anchor: Some("Hero".into()),
            preposition: Some(Preposition::Below),
            prompt: "create a pricing section called Pricing below the hero".into(),
            image_url: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome.summary, "Created Pricing below Hero");
    assert_eq!(fx.read("src/components/Pricing.tsx").trim_end(), PRICING);

    let page = fx.read("src/app/page.tsx");
    assert!(page.contains("import Pricing from \"@/components/Pricing\";"));
    let hero = page.find("<Hero />").unwrap();
    let pricing = page.find("<Pricing />").unwrap();
    let demo = page.find("<Demo />").unwrap();
    assert!(hero < pricing && pricing < demo);

    // The anchor component is sent as a style reference
    let sent = &fx.provider.requests()[0];
    assert!(sent.messages[1].content.contains("Ship faster"));
}

#[tokio::test]
async fn visual_edit_creation_is_hard_fail() {
    let fx = Fixture::new(
        ScriptedChecker::always_fail("error TS2304"),
        &[PRICING, PRICING, PRICING, PRICING],
    );
    let err = fx
        .run(ToolInstructions::VisualEdit {
            component_name: "Pricing".into(),
            anchor: None,
            preposition: None,
            prompt: "create a pricing section".into(),
            image_url: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::ValidationExhausted { attempts: 3, .. }));
    // One generation plus three fixes
    assert_eq!(fx.provider.call_count(), 4);
    assert!(!fx.read("src/app/page.tsx").contains("Pricing"));

    // The rejected component is not left behind as a known target
    assert!(!fx.dir.path().join("src/components/Pricing.tsx").exists());
    let store = DocumentStore::new(fx.dir.path(), &ProjectConfig::default());
    assert_eq!(store.list_targets().await.unwrap(), vec!["Demo", "Hero"]);
}

#[tokio::test]
async fn generator_is_resolved_only_on_the_visual_path() {
    let fx = Fixture::new(ScriptedChecker::always_pass(), &[PRICING]);
    fx.run(ToolInstructions::Delete {
        component: "Demo".into(),
    })
    .await
    .unwrap();
    assert_eq!(fx.factory_calls.load(Ordering::SeqCst), 0);

    fx.run(ToolInstructions::VisualEdit {
        component_name: "Pricing".into(),
        anchor: None,
        preposition: None,
        prompt: "create a pricing section".into(),
        image_url: Some("https://example.com/pricing.png".into()),
    })
    .await
    .unwrap();
    assert_eq!(fx.factory_calls.load(Ordering::SeqCst), 1);
    assert!(fx.provider.requests()[0].messages[1].content.contains("pricing.png"));
}

#[tokio::test]
async fn failed_generator_resolution_is_reported() {
    let source = GeneratorSource::lazy(|| {
        Err(AgentError::ExternalServiceUnavailable("no completion provider configured".into()))
    });
    let err = source.get().err().unwrap();
    assert_eq!(err.kind(), "ExternalServiceUnavailable");
    assert!(!source.is_resolved());
}
