cfn_resource! {
    /// Bucket AWS CloudFormation Resource (AWS::S3::Bucket)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-s3-bucket.html
    pub struct Bucket = "AWS::S3::Bucket" {
        "AccelerateConfiguration" => accelerate_configuration,
        "AccessControl" => access_control,
        "AnalyticsConfigurations" => analytics_configurations,
        "BucketEncryption" => bucket_encryption,
        "BucketName" => bucket_name,
        "CorsConfiguration" => cors_configuration,
        "IntelligentTieringConfigurations" => intelligent_tiering_configurations,
        "InventoryConfigurations" => inventory_configurations,
        "LifecycleConfiguration" => lifecycle_configuration,
        "LoggingConfiguration" => logging_configuration,
        "MetricsConfigurations" => metrics_configurations,
        "NotificationConfiguration" => notification_configuration,
        "ObjectLockConfiguration" => object_lock_configuration,
        "ObjectLockEnabled" => object_lock_enabled,
        "OwnershipControls" => ownership_controls,
        "PublicAccessBlockConfiguration" => public_access_block_configuration,
        "ReplicationConfiguration" => replication_configuration,
        "Tags" => tags,
        "VersioningConfiguration" => versioning_configuration,
        "WebsiteConfiguration" => website_configuration,
    }
}

cfn_resource! {
    /// BucketPolicy AWS CloudFormation Resource (AWS::S3::BucketPolicy)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-s3-policy.html
    pub struct BucketPolicy = "AWS::S3::BucketPolicy" {
        /// Required: true
        "Bucket" => bucket,
        /// Required: true
        "PolicyDocument" => policy_document,
    }
}
