cfn_resource! {
    /// Function AWS CloudFormation Resource (AWS::Lambda::Function)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-resource-lambda-function.html
    pub struct Function = "AWS::Lambda::Function" {
        "Architectures" => architectures,
        /// Required: true
        "Code" => code,
        "CodeSigningConfigArn" => code_signing_config_arn,
        "DeadLetterConfig" => dead_letter_config,
        "Description" => description,
        "Environment" => environment,
        "EphemeralStorage" => ephemeral_storage,
        "FileSystemConfigs" => file_system_configs,
        "FunctionName" => function_name,
        "Handler" => handler,
        "ImageConfig" => image_config,
        "KmsKeyArn" => kms_key_arn,
        "Layers" => layers,
        "LoggingConfig" => logging_config,
        "MemorySize" => memory_size,
        "PackageType" => package_type,
        "ReservedConcurrentExecutions" => reserved_concurrent_executions,
        /// Required: true
        "Role" => role,
        "Runtime" => runtime,
        "RuntimeManagementConfig" => runtime_management_config,
        "SnapStartConfig" => snap_start_config,
        "Tags" => tags,
        "Timeout" => timeout,
        "TracingConfig" => tracing_config,
        "VpcConfig" => vpc_config,
    }
}
