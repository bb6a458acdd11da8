cfn_resource! {
    /// Topic AWS CloudFormation Resource (AWS::SNS::Topic)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-sns-topic.html
    pub struct Topic = "AWS::SNS::Topic" {
        "ArchivePolicy" => archive_policy,
        "ContentBasedDeduplication" => content_based_deduplication,
        "DataProtectionPolicy" => data_protection_policy,
        "DisplayName" => display_name,
        "FifoTopic" => fifo_topic,
        "KmsMasterKeyId" => kms_master_key_id,
        "SignatureVersion" => signature_version,
        "Subscription" => subscription,
        "Tags" => tags,
        "TopicName" => topic_name,
        "TracingConfig" => tracing_config,
    }
}

cfn_resource! {
    /// Subscription AWS CloudFormation Resource (AWS::SNS::Subscription)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-resource-sns-subscription.html
    pub struct Subscription = "AWS::SNS::Subscription" {
        "DeliveryPolicy" => delivery_policy,
        "Endpoint" => endpoint,
        "FilterPolicy" => filter_policy,
        "FilterPolicyScope" => filter_policy_scope,
        /// Required: true
        "Protocol" => protocol,
        "RawMessageDelivery" => raw_message_delivery,
        "RedrivePolicy" => redrive_policy,
        "Region" => region,
        "ReplayPolicy" => replay_policy,
        "SubscriptionRoleArn" => subscription_role_arn,
        /// Required: true
        "TopicArn" => topic_arn,
    }
}
