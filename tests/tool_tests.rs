/// Tests for the file tools against temporary directories
use std::fs;

use membership_sync_tools::deploy::DeploymentPlan;
use membership_sync_tools::patch::inject_cors_dir;

const WITH_CORS: &str = "const corsHeaders = { 'Access-Control-Allow-Origin': '*' };\n\
serve(async (req) => new Response('ok', { headers: corsHeaders }));\n";

const WITHOUT_CORS: &str = "import { serve } from \"https://deno.land/std@0.168.0/http/server.ts\";\n\
serve(async (req) => {\n  const key = Deno.env.get('THIRDWEB_SECRET_KEY');\n  return new Response(key);\n});\n";

#[test]
fn test_inject_cors_dir_patches_only_missing() {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [("auth", WITH_CORS), ("balance", WITHOUT_CORS)] {
        fs::create_dir_all(dir.path().join(name)).unwrap();
        fs::write(dir.path().join(name).join("index.ts"), body).unwrap();
    }
    fs::write(dir.path().join("README.md"), "not a function").unwrap();

    let summary = inject_cors_dir(dir.path(), false).unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.patched, 1);
    assert_eq!(summary.already_present, 1);
    assert!(summary.failed.is_empty());

    let patched = fs::read_to_string(dir.path().join("balance/index.ts")).unwrap();
    assert!(patched.contains("const corsHeaders"));
    assert!(patched.contains("req.method === 'OPTIONS'"));
    let untouched = fs::read_to_string(dir.path().join("auth/index.ts")).unwrap();
    assert_eq!(untouched, WITH_CORS);

    // Second run finds nothing left to do.
    let again = inject_cors_dir(dir.path(), false).unwrap();
    assert_eq!(again.patched, 0);
    assert_eq!(again.already_present, 2);
}

#[test]
fn test_inject_cors_dir_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("balance")).unwrap();
    let file = dir.path().join("balance/index.ts");
    fs::write(&file, WITHOUT_CORS).unwrap();

    let summary = inject_cors_dir(dir.path(), true).unwrap();
    assert_eq!(summary.patched, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), WITHOUT_CORS);
}

#[test]
fn test_inject_cors_dir_counts_files_without_handler() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("helpers")).unwrap();
    fs::create_dir_all(dir.path().join("balance")).unwrap();
    fs::write(
        dir.path().join("helpers/index.ts"),
        "export const ok = () => new Response('ok');\n",
    )
    .unwrap();
    fs::write(dir.path().join("balance/index.ts"), WITHOUT_CORS).unwrap();

    let summary = inject_cors_dir(dir.path(), false).unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.patched, 2);
    assert_eq!(summary.without_handler, 1);

    let helpers = fs::read_to_string(dir.path().join("helpers/index.ts")).unwrap();
    assert!(helpers.starts_with("const corsHeaders"));
    assert!(!helpers.contains("req.method === 'OPTIONS'"));
}

#[test]
fn test_inject_cors_dir_rejects_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    assert!(inject_cors_dir(&dir.path().join("missing"), false).is_err());
}

#[test]
fn test_deployment_plan_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let func_dir = dir.path().join("supabase/functions/balance");
    fs::create_dir_all(&func_dir).unwrap();
    let file = func_dir.join("index.ts");
    fs::write(&file, WITHOUT_CORS).unwrap();

    let plan = DeploymentPlan::from_path(&file, Some("abcd1234".to_string())).unwrap();
    assert_eq!(plan.function_name, "balance");
    assert_eq!(
        plan.deploy_command(),
        "supabase functions deploy balance --project-ref abcd1234"
    );

    let rendered = plan.render();
    assert!(rendered.contains("supabase secrets set THIRDWEB_SECRET_KEY=..."));
    assert!(rendered.contains("Nothing was deployed."));
}

#[test]
fn test_deployment_plan_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(DeploymentPlan::from_path(&dir.path().join("nope/index.ts"), None).is_err());
}
