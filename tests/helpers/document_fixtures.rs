//! Common CMMN document fixtures for tests.

pub const CMMN_NS: &str = "http://www.omg.org/spec/CMMN/20151109/MODEL";

/// One case, one human task.
pub const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"
             xmlns:flowable="http://flowable.org/cmmn"
             targetNamespace="http://flowable.org/cmmn"
             creationDate="2024-03-01T10:15:00Z">
  <case id="claimCase" name="Claim" flowable:initiatorVariableName="initiator">
    <casePlanModel id="claimPlan" name="Claim plan">
      <planItem id="reviewItem" name="Review" definitionRef="reviewTask"/>
      <humanTask id="reviewTask" name="Review claim" flowable:assignee="${initiator}"
                 flowable:candidateGroups="claims, management">
        <documentation>Check the submitted claim</documentation>
      </humanTask>
    </casePlanModel>
  </case>
</definitions>"#;

/// Two tasks joined by a sentry with an if part, plus a process task,
/// a milestone, item controls and an association.
pub const CLAIM_FLOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"
             xmlns:flowable="http://flowable.org/cmmn"
             targetNamespace="urn:claims">
  <case id="claims" name="Claims">
    <casePlanModel id="plan" name="Claims plan" autoComplete="true">
      <planItem id="review" definitionRef="reviewTask">
        <itemControl>
          <requiredRule><condition>${mandatory}</condition></requiredRule>
        </itemControl>
      </planItem>
      <planItem id="approve" definitionRef="approveTask">
        <entryCriterion id="approveEntry" sentryRef="afterReview"/>
      </planItem>
      <planItem id="payout" definitionRef="payoutProcess">
        <entryCriterion id="payoutEntry" sentryRef="afterApprove"/>
        <exitCriterion id="payoutExit" sentryRef="afterReview"/>
      </planItem>
      <planItem id="done" definitionRef="doneMilestone">
        <entryCriterion id="doneEntry" sentryRef="afterPayout"/>
      </planItem>
      <sentry id="afterReview">
        <planItemOnPart id="onReview" sourceRef="review">
          <standardEvent>complete</standardEvent>
        </planItemOnPart>
        <ifPart id="reviewOk"><condition>${approved}</condition></ifPart>
      </sentry>
      <sentry id="afterApprove">
        <planItemOnPart id="onApprove" sourceRef="approve">
          <standardEvent>complete</standardEvent>
        </planItemOnPart>
      </sentry>
      <sentry id="afterPayout">
        <planItemOnPart id="onPayout" sourceRef="payout">
          <standardEvent>complete</standardEvent>
        </planItemOnPart>
      </sentry>
      <humanTask id="reviewTask" name="Review"/>
      <task id="approveTask" name="Approve" flowable:type="java"
            flowable:class="org.example.Approve" flowable:async="true">
        <extensionElements>
          <flowable:field name="level">
            <flowable:string>senior</flowable:string>
          </flowable:field>
        </extensionElements>
      </task>
      <processTask id="payoutProcess" name="Payout" processRef="payoutBpmn">
        <defaultControl>
          <repetitionRule flowable:counterVariable="attempt" flowable:maxInstanceCount="3">
            <condition>${retry}</condition>
          </repetitionRule>
        </defaultControl>
      </processTask>
      <milestone id="doneMilestone" name="Done"/>
    </casePlanModel>
  </case>
  <process id="payoutBpmn" name="Payout process" externalRef="payout"/>
  <association id="note1Link" sourceRef="review" targetRef="note1"/>
  <textAnnotation id="note1"><text>Reviewed by two people</text></textAnnotation>
</definitions>"#;

/// An on-part in the plan model whose source is inside a child stage.
pub const ON_PART_INTO_CHILD_STAGE: &str = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c">
    <casePlanModel id="plan">
      <planItem id="followUp" definitionRef="followUpTask">
        <entryCriterion id="followUpEntry" sentryRef="innerDone"/>
      </planItem>
      <planItem id="child" definitionRef="childStage"/>
      <sentry id="innerDone">
        <planItemOnPart id="onInner" sourceRef="innerTask">
          <standardEvent>complete</standardEvent>
        </planItemOnPart>
      </sentry>
      <stage id="childStage">
        <planItem id="innerTask" definitionRef="innerTaskDef"/>
        <task id="innerTaskDef"/>
      </stage>
      <task id="followUpTask"/>
    </casePlanModel>
  </case>
</definitions>"#;

/// An on-part inside a child stage whose source is in the plan model.
pub const ON_PART_INTO_PARENT_STAGE: &str = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c">
    <casePlanModel id="plan">
      <planItem id="outerTask" definitionRef="outerTaskDef"/>
      <planItem id="child" definitionRef="childStage"/>
      <stage id="childStage">
        <planItem id="innerTask" definitionRef="innerTaskDef">
          <entryCriterion id="innerEntry" sentryRef="outerDone"/>
        </planItem>
        <sentry id="outerDone">
          <planItemOnPart id="onOuter" sourceRef="outerTask">
            <standardEvent>complete</standardEvent>
          </planItemOnPart>
        </sentry>
        <task id="innerTaskDef"/>
      </stage>
      <task id="outerTaskDef"/>
    </casePlanModel>
  </case>
</definitions>"#;

/// A timer inside a child stage started by a plan item of the plan model.
pub const TIMER_FROM_ANCESTOR: &str = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c">
    <casePlanModel id="plan">
      <planItem id="outerTask" definitionRef="outerTaskDef"/>
      <planItem id="child" definitionRef="childStage"/>
      <stage id="childStage">
        <planItem id="reminder" definitionRef="reminderTimer"/>
        <timerEventListener id="reminderTimer">
          <timerExpression>PT1H</timerExpression>
          <planItemStartTrigger id="reminderTrigger" sourceRef="outerTask">
            <standardEvent>complete</standardEvent>
          </planItemStartTrigger>
        </timerEventListener>
      </stage>
      <task id="outerTaskDef"/>
    </casePlanModel>
  </case>
</definitions>"#;

/// A timer in the plan model started by a plan item of a child stage.
pub const TIMER_FROM_DESCENDANT: &str = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c">
    <casePlanModel id="plan">
      <planItem id="reminder" definitionRef="reminderTimer"/>
      <planItem id="child" definitionRef="childStage"/>
      <stage id="childStage">
        <planItem id="innerTask" definitionRef="innerTaskDef"/>
        <task id="innerTaskDef"/>
      </stage>
      <timerEventListener id="reminderTimer">
        <timerExpression>PT1H</timerExpression>
        <planItemStartTrigger sourceRef="innerTask">
          <standardEvent>complete</standardEvent>
        </planItemStartTrigger>
      </timerEventListener>
    </casePlanModel>
  </case>
</definitions>"#;

/// Plan items joined by a sentry, drawn with shapes, a label and a
/// connector from the source item to the entry criterion.
pub const WITH_DIAGRAM: &str = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"
             xmlns:cmmndi="http://www.omg.org/spec/CMMN/20151109/CMMNDI"
             xmlns:dc="http://www.omg.org/spec/CMMN/20151109/DC"
             xmlns:di="http://www.omg.org/spec/CMMN/20151109/DI">
  <case id="c">
    <casePlanModel id="plan">
      <planItem id="first" definitionRef="firstTask"/>
      <planItem id="second" definitionRef="secondTask">
        <entryCriterion id="secondEntry" sentryRef="afterFirst"/>
      </planItem>
      <sentry id="afterFirst">
        <planItemOnPart id="onFirst" sourceRef="first">
          <standardEvent>complete</standardEvent>
        </planItemOnPart>
      </sentry>
      <task id="firstTask"/>
      <task id="secondTask"/>
    </casePlanModel>
  </case>
  <cmmndi:CMMNDI>
    <cmmndi:CMMNDiagram id="diagram1" name="Main">
      <cmmndi:CMMNShape id="CMMNShape_plan" cmmnElementRef="plan">
        <dc:Bounds height="400" width="600" x="0" y="0"/>
      </cmmndi:CMMNShape>
      <cmmndi:CMMNShape id="CMMNShape_first" cmmnElementRef="first">
        <dc:Bounds height="80" width="100" x="50" y="50"/>
        <cmmndi:CMMNLabel><dc:Bounds height="20" width="40" x="60" y="140"/></cmmndi:CMMNLabel>
      </cmmndi:CMMNShape>
      <cmmndi:CMMNShape id="CMMNShape_second" cmmnElementRef="second">
        <dc:Bounds height="80" width="100" x="250" y="50"/>
      </cmmndi:CMMNShape>
      <cmmndi:CMMNShape id="CMMNShape_ghost" cmmnElementRef="ghost">
        <dc:Bounds height="10" width="10" x="0" y="0"/>
      </cmmndi:CMMNShape>
      <cmmndi:CMMNEdge id="connector1" sourceCMMNElementRef="first" targetCMMNElementRef="secondEntry">
        <di:waypoint x="150" y="90"/>
        <di:waypoint x="250" y="90"/>
      </cmmndi:CMMNEdge>
    </cmmndi:CMMNDiagram>
  </cmmndi:CMMNDI>
</definitions>"#;

/// A document with one plan item named `existing_id` followed by `n`
/// anonymous plan items, all over one milestone.
pub fn anonymous_plan_items(n: usize, existing_id: &str) -> String {
    let items: String = (0..n)
        .map(|_| r#"<planItem definitionRef="m"/>"#)
        .collect::<Vec<_>>()
        .join("\n      ");
    format!(
        r#"<definitions xmlns="{CMMN_NS}">
  <case id="c">
    <casePlanModel id="plan">
      <planItem id="{existing_id}" definitionRef="m"/>
      {items}
      <milestone id="m"/>
    </casePlanModel>
  </case>
</definitions>"#
    )
}
