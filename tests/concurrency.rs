use std::thread;

use cfn_model::{catalog, Catalog, Format, Loader, Resource, Template, Value};

const TEMPLATE: &str = r#"
Parameters:
  Env:
    Type: String
Resources:
  Jobs:
    Type: AWS::SQS::Queue
    Properties:
      QueueName: !Sub "${Env}-jobs"
  Logs:
    Type: AWS::S3::Bucket
    DependsOn: Jobs
  Future:
    Type: AWS::Foo::Bar
Outputs:
  JobsArn:
    Value: !GetAtt Jobs.Arn
"#;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_model_types_are_send_and_sync() {
    assert_send_sync::<Template>();
    assert_send_sync::<Resource>();
    assert_send_sync::<Value>();
    assert_send_sync::<Catalog>();
    assert_send_sync::<&'static Catalog>();
}

#[test]
fn test_concurrent_dumps_of_one_template() {
    let template = Template::load(TEMPLATE.as_bytes()).unwrap();
    let expected_json = template.dump(Format::Json).unwrap();
    let expected_yaml = template.dump(Format::Yaml).unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let template = &template;
                scope.spawn(move || {
                    let format = if i % 2 == 0 { Format::Json } else { Format::Yaml };
                    (format, template.dump(format).unwrap())
                })
            })
            .collect();
        for handle in handles {
            let (format, dumped) = handle.join().unwrap();
            match format {
                Format::Json => assert_eq!(dumped, expected_json),
                Format::Yaml => assert_eq!(dumped, expected_yaml),
            }
        }
    });
}

#[test]
fn test_concurrent_loads_share_builtin_catalog() {
    let catalog = catalog::builtin();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(move || {
                    assert!(catalog.lookup("AWS::SQS::Queue").is_some());
                    assert!(catalog.lookup("AWS::Foo::Bar").is_none());
                    Loader::with_catalog(catalog)
                        .load(TEMPLATE.as_bytes())
                        .unwrap()
                })
            })
            .collect();
        let templates: Vec<Template> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        for template in &templates {
            assert_eq!(template.get_all_sqs_queue_resources().len(), 1);
            assert!(!template.resources["Future"].is_specialized());
            assert_eq!(template, &templates[0]);
        }
    });
}
