cfn_resource! {
    /// Queue AWS CloudFormation Resource (AWS::SQS::Queue)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-resource-sqs-queue.html
    pub struct Queue = "AWS::SQS::Queue" {
        "ContentBasedDeduplication" => content_based_deduplication,
        "DeduplicationScope" => deduplication_scope,
        "DelaySeconds" => delay_seconds,
        "FifoQueue" => fifo_queue,
        "FifoThroughputLimit" => fifo_throughput_limit,
        "KmsDataKeyReusePeriodSeconds" => kms_data_key_reuse_period_seconds,
        "KmsMasterKeyId" => kms_master_key_id,
        "MaximumMessageSize" => maximum_message_size,
        "MessageRetentionPeriod" => message_retention_period,
        /// Required: false. Generated by CloudFormation when unset.
        "QueueName" => queue_name,
        "ReceiveMessageWaitTimeSeconds" => receive_message_wait_time_seconds,
        "RedriveAllowPolicy" => redrive_allow_policy,
        "RedrivePolicy" => redrive_policy,
        "SqsManagedSseEnabled" => sqs_managed_sse_enabled,
        "Tags" => tags,
        "VisibilityTimeout" => visibility_timeout,
    }
}

cfn_resource! {
    /// QueuePolicy AWS CloudFormation Resource (AWS::SQS::QueuePolicy)
    /// See: http://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-sqs-policy.html
    pub struct QueuePolicy = "AWS::SQS::QueuePolicy" {
        /// Required: true
        "PolicyDocument" => policy_document,
        /// Required: true
        "Queues" => queues,
    }
}
